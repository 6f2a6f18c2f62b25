use thiserror::Error;

#[derive(Error, Debug)]
pub enum MongerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to iterate objects: {0}")]
    Iteration(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MongerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MongerError>;
