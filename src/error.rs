use thiserror::Error;

/// Errors that can occur while composing a review post
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The generation provider failed or returned an empty body
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The generated response contained no parseable markup
    #[error("No content produced from the generated response")]
    NoContent,

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// History store failure (only surfaced by the `try_*` history calls)
    #[error("History error: {0}")]
    HistoryError(#[from] HistoryError),

    /// Failed to read an image file handed to the builder
    #[error("Image error: {0}")]
    ImageError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

/// Errors raised by the file-backed history log
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("History file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The advisory lock stayed held by another process for every attempt
    #[error("History file still locked after {attempts} attempts")]
    LockContended { attempts: u32 },
}
