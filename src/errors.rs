// ABOUTME: Error types for the big-deck engine
// ABOUTME: Provides structured error handling for parsing, theming, export and watching

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Theme error: {message}")]
    ThemeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Image export error: {0}")]
    ExportError(String),

    #[error("Print error: {0}")]
    PrintError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Watch error: {0}")]
    WatchError(String),
}

impl DeckError {
    /// Shorthand for a parse error at a 1-based line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        DeckError::ParseError {
            line,
            message: message.into(),
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, DeckError::ParseError { .. })
    }
}

// Implement conversion from watcher errors
impl From<notify::Error> for DeckError {
    fn from(err: notify::Error) -> Self {
        DeckError::WatchError(format!("File watcher failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
