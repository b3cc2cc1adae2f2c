use reqwest::StatusCode;

/// Errors surfaced by the admin library.
///
/// Validation errors are raised before any request is built. Everything the
/// server or the network reports arrives as `Http` or `Transport`; a 401 is
/// lifted into `Unauthenticated` so callers can send the user back to login.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    #[error("Not authenticated, run `news-admin login` first")]
    Unauthenticated,

    #[error("Server error ({status}): {body}")]
    Http { status: StatusCode, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl AdminError {
    /// Whether a read request hitting this error is worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdminError::Transport(_) => true,
            AdminError::Http { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AdminError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
