//! Error types for logmark

use thiserror::Error;

/// Result type alias for logmark operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Please specify the text to highlight.")]
    EmptyPattern,

    #[error("Duplicate text. Please add unique text to the list.")]
    Duplicate(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No active document")]
    NoActiveDocument,

    #[error("Could not switch view: {0}")]
    ViewSync(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Malformed command: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

impl HighlightError {
    /// Whether this error should be shown to the user.
    ///
    /// A missing document is expected whenever no file is open.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, HighlightError::NoActiveDocument)
    }
}
