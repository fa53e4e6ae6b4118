//! Listing image intake: size and MIME checks, then a write to local disk.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::UploadConfig;

/// Public URL prefix the API server mounts the upload directory under.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// A file received from a multipart form, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Only image files are allowed! (received {0})")]
    NotAnImage(String),
    #[error("Image exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, UploadError::NotAnImage(_) | UploadError::TooLarge { .. })
    }
}

/// Writes accepted images under a single directory served at [`UPLOAD_URL_PREFIX`].
#[derive(Debug, Clone)]
pub struct ImageStore {
    directory: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(directory: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            directory: directory.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.directory.clone(), config.max_bytes)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn validate(&self, upload: &ImageUpload) -> Result<(), UploadError> {
        let content_type = upload.content_type.as_deref().unwrap_or_default();
        let is_image = content_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            let received = if content_type.is_empty() {
                "no content type".to_string()
            } else {
                content_type.to_string()
            };
            return Err(UploadError::NotAnImage(received));
        }

        if upload.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        Ok(())
    }

    /// Validate and persist the upload, returning the public URL path.
    pub async fn save(&self, upload: ImageUpload) -> Result<String, UploadError> {
        self.validate(&upload)?;

        tokio::fs::create_dir_all(&self.directory).await?;
        let file_name = stored_file_name(&upload);
        let path = self.directory.join(&file_name);
        tokio::fs::write(&path, &upload.bytes).await?;

        debug!(path = %path.display(), bytes = upload.bytes.len(), "stored listing image");
        Ok(format!("{UPLOAD_URL_PREFIX}/{file_name}"))
    }
}

/// `<field>-<millis>-<random><ext>`, keeping the client's extension when it has one.
fn stored_file_name(upload: &ImageUpload) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let suffix = fastrand::u32(0..1_000_000_000);
    let field = if upload.field_name.is_empty() {
        "image"
    } else {
        upload.field_name.as_str()
    };
    format!("{field}-{millis}-{suffix}{}", extension_for(upload))
}

fn extension_for(upload: &ImageUpload) -> String {
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase());

    let from_mime = || {
        upload
            .content_type
            .as_deref()
            .and_then(mime_guess::get_mime_extensions_str)
            .and_then(|extensions| extensions.first())
            .map(|ext| ext.to_string())
    };

    from_name
        .or_else(from_mime)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
