use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GriddleError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tracker API error {status_code}: {message}")]
    RemoteApi { status_code: i64, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GriddleError>;

impl From<reqwest::Error> for GriddleError {
    fn from(e: reqwest::Error) -> Self {
        GriddleError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for GriddleError {
    fn from(e: serde_json::Error) -> Self {
        GriddleError::Json(e.to_string())
    }
}

impl GriddleError {
    /// True when the failure came back from the remote service itself rather
    /// than the network path in front of it.
    pub fn is_remote(&self) -> bool {
        matches!(self, GriddleError::RemoteApi { .. })
    }
}
