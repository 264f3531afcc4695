use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any computation starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::InvalidInput(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::InvalidInput(msg.to_owned())
    }
}

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
