use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::users::{AuthorSummary, UserId};
use crate::domains::{FlexibleNumber, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

/// Free-form community board entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

/// Body accepted by `POST /api/posts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSubmission {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author_id: Option<FlexibleNumber>,
}

impl PostSubmission {
    pub fn validate(self) -> Result<NewPost, ServiceError> {
        let title = required_text(self.title, "Title is required")?;
        let content = required_text(self.content, "Content is required")?;
        let author_id = author_id(self.author_id.as_ref())?;
        Ok(NewPost {
            title,
            content,
            author_id,
        })
    }
}

pub(crate) fn required_text(value: Option<String>, message: &str) -> Result<String, ServiceError> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ServiceError::validation(message))
}

pub(crate) fn author_id(raw: Option<&FlexibleNumber>) -> Result<UserId, ServiceError> {
    let raw = raw
        .filter(|value| !value.is_blank())
        .ok_or_else(|| ServiceError::validation("authorId is required"))?;
    raw.as_integer()
        .map(UserId)
        .ok_or_else(|| ServiceError::validation("authorId must be an integer"))
}
