use crate::models::notification::Toast;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn user_not_found(id: &str) -> Self {
        Error::NotFound(format!("User {} not found", id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// User-facing notification for a failed operation.
    pub fn toast(&self) -> Toast {
        let (title, description) = match self {
            Error::NotFound(msg) => ("Not found", msg.clone()),
            Error::Validation(err) => ("Invalid input", err.to_string()),
            Error::BadRequest(msg) => ("Invalid request", msg.clone()),
            Error::Json(err) => ("Invalid input", err.to_string()),
            _ => (
                "Something went wrong",
                "An unexpected error occurred".to_string(),
            ),
        };
        Toast::destructive(title, description)
    }
}
