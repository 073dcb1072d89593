use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// Message shown to the user and recorded in the stores' `error` field.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http { message, .. } => message.clone(),
            AppError::Network(msg) => format!("Network Error: {}", msg),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Auth(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Unexpected response from server".to_string()
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Client is not configured correctly".to_string()
            }
            AppError::ExternalServiceError(msg) => msg.clone(),
        }
    }

    /// HTTP status of the failed request, when the failure came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            AppError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Network("request timed out".to_string())
        } else if e.is_decode() {
            AppError::ExternalServiceError(format!("Failed to decode response: {}", e))
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
