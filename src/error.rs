use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Audio conversion failed: {0}")]
    Conversion(String),

    #[error("Audio chunking failed: {0}")]
    Chunking(String),

    #[error("Sanitization failed: {0}")]
    Sanitization(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;
