//! Error types for esxstat-core

use std::time::Duration;

use thiserror::Error;

use crate::config::Category;

/// Errors raised while validating configuration, before any polling starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A monitored condition outside hosts/vms/datastores
    #[error("unknown monitored condition: {0}")]
    UnknownCategory(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during a poll cycle
///
/// None of these escape a cycle: the poller logs them and records them in the
/// cycle report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// Authentication or network failure reaching the endpoint
    #[error("connection failed: {0}")]
    Connection(String),

    /// Listing (or releasing the listing of) a category failed
    #[error("failed to enumerate {category}: {message}")]
    Enumeration {
        /// Category being enumerated
        category: Category,
        /// Error details
        message: String,
    },

    /// An object's summary fields could not be read
    #[error("failed to extract {category} object `{object}`: {message}")]
    Extraction {
        /// Category of the object
        category: Category,
        /// Object identifier
        object: String,
        /// Error details
        message: String,
    },

    /// An endpoint call did not finish in time
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Operation that was cut off
        operation: String,
        /// Category in progress, if any
        category: Option<Category>,
        /// Configured bound
        after: Duration,
    },
}

impl PollError {
    /// Build an enumeration error
    pub fn enumeration(category: Category, message: impl Into<String>) -> Self {
        PollError::Enumeration {
            category,
            message: message.into(),
        }
    }

    /// Build an extraction error
    pub fn extraction(
        category: Category,
        object: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PollError::Extraction {
            category,
            object: object.into(),
            message: message.into(),
        }
    }

    /// Category the error is scoped to, `None` for cycle-wide failures
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        match self {
            PollError::Connection(_) => None,
            PollError::Enumeration { category, .. } | PollError::Extraction { category, .. } => {
                Some(*category)
            }
            PollError::Timeout { category, .. } => *category,
        }
    }

    /// Short tag naming the variant
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Connection(_) => "connection",
            PollError::Enumeration { .. } => "enumeration",
            PollError::Extraction { .. } => "extraction",
            PollError::Timeout { .. } => "timeout",
        }
    }

    /// Check if a later cycle is likely to succeed without operator action
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, PollError::Connection(_) | PollError::Timeout { .. })
    }
}
