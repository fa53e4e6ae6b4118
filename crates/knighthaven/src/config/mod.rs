use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub yelp: YelpConfig,
    pub maps: MapsConfig,
    pub uploads: UploadConfig,
    pub campus: CampusConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://knighthaven.db?mode=rwc".to_string()),
            max_connections: parse_number("DATABASE_MAX_CONNECTIONS", 5)?,
        };

        let yelp = YelpConfig {
            api_key: optional_var("YELP_API_KEY"),
            base_url: env::var("YELP_API_BASE")
                .unwrap_or_else(|_| "https://api.yelp.com/v3".to_string()),
        };

        let maps = MapsConfig {
            api_key: optional_var("GOOGLE_MAPS_API_KEY"),
        };

        let uploads = UploadConfig {
            directory: PathBuf::from(
                env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            max_bytes: parse_number("UPLOAD_MAX_BYTES", 5 * 1024 * 1024)?,
        };

        let campus = CampusConfig {
            email_domain: env::var("CAMPUS_EMAIL_DOMAIN").unwrap_or_else(|_| "ucf.edu".to_string()),
        };

        let auth = AuthConfig {
            jwt_secret: optional_var("AUTH_JWT_SECRET"),
            jwt_public_key: optional_var("AUTH_JWT_PUBLIC_KEY").map(PathBuf::from),
            issuer: optional_var("AUTH_JWT_ISSUER"),
            audience: optional_var("AUTH_JWT_AUDIENCE"),
        };

        if environment.is_production() && !auth.has_key() {
            return Err(ConfigError::MissingAuthKey);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database,
            yelp,
            maps,
            uploads,
            campus,
            auth,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(key) {
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidNumber { key }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Yelp Fusion credentials. Without a key the directory reports every search as failed.
#[derive(Debug, Clone)]
pub struct YelpConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct MapsConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub directory: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct CampusConfig {
    pub email_domain: String,
}

/// Bearer token verification keys for the profile endpoint.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<PathBuf>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn has_key(&self) -> bool {
        self.jwt_secret.is_some() || self.jwt_public_key.is_some()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    MissingAuthKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
            ConfigError::MissingAuthKey => write!(
                f,
                "AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY is required when APP_ENV=production"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::MissingAuthKey => None,
        }
    }
}
