use crate::views::form::ValidationErrors;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Service '{0}' not found. Run: uptimex services list")]
    ServiceNotFound(String),

    #[error("Request failed with status {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid service: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("Failed to read config: {0}")]
    ConfigRead(std::io::Error),

    #[error("Failed to write config: {0}")]
    ConfigWrite(std::io::Error),

    #[error("Invalid config format: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// True for failures that never reached the server or never returned.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::ServiceNotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CliError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
