//! Error types for the grid renderer and its HTTP front end

use thiserror::Error;

/// Result type alias for gridpng operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding, rendering or serving a grid
#[derive(Error, Debug)]
pub enum Error {
    /// The request body could not be decoded as a form
    #[error("Invalid form body: {0}")]
    InvalidForm(String),

    /// A required form field was absent
    #[error("Missing form field \"{0}\"")]
    MissingField(&'static str),

    /// The request body exceeded the configured limit
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// The grid JSON was malformed or a channel was out of range
    #[error("Invalid grid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The grid decoded but has an unusable shape
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    /// Reading the request or writing the image failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server could not be started
    #[error("Server error: {0}")]
    ServerError(String),
}

impl Error {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidForm(_)
                | Error::MissingField(_)
                | Error::PayloadTooLarge(_)
                | Error::Json(_)
                | Error::InvalidGrid(_)
        )
    }

    /// HTTP status code used when the error is reported to a client.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}
