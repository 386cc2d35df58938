//! Error handling for the Scribe system

use thiserror::Error;

/// Result type alias for Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Main error type for the Scribe system
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Network failure, timeout or non-success status while talking to the server
    #[error("Communication error: {0}")]
    Communication(String),

    /// A nominally successful response could not be interpreted
    #[error("Response handling error: {0}")]
    ResponseHandling(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Multipart encoding and parsing errors
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Page capability errors (missing element, detached widget)
    #[error("Page error: {0}")]
    Page(String),

    /// Reference server errors
    #[error("Server error: {0}")]
    Server(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScribeError {
    /// Create a new communication error
    pub fn communication<S: Into<String>>(msg: S) -> Self {
        Self::Communication(msg.into())
    }

    /// Create a new response handling error
    pub fn response_handling<S: Into<String>>(msg: S) -> Self {
        Self::ResponseHandling(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a new page error
    pub fn page<S: Into<String>>(msg: S) -> Self {
        Self::Page(msg.into())
    }

    /// Create a new server error
    pub fn server<S: Into<String>>(msg: S) -> Self {
        Self::Server(msg.into())
    }
}
