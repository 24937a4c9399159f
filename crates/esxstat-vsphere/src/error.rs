//! Error types for the vSphere client

use thiserror::Error;

/// Errors that can occur talking to the vSphere REST API
#[derive(Error, Debug)]
pub enum VsphereError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid endpoint URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Credentials rejected or session expired
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Object does not exist on the endpoint
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Request issued before login
    #[error("no active session")]
    NoSession,

    /// Release of a view this connection never handed out
    #[error("unknown view: {0}")]
    UnknownView(String),
}

impl VsphereError {
    /// Check if the request ran into the client timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, VsphereError::Http(e) if e.is_timeout())
    }
}

/// Result type for vSphere operations
pub type Result<T> = std::result::Result<T, VsphereError>;
