//! Error types for Plexus.
//!
//! Lookups never fail: a missing capability, operation, event or mistyped
//! extension value is reported as `None`. Errors only exist for bootstrap
//! hooks, which are allowed to fail and halt startup.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`Loader::bootstrap`](crate::Loader::bootstrap) hook.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The hook failed with an underlying error.
    #[error("load failed: {0}")]
    Failed(#[source] BoxError),

    /// The hook failed with a plain message.
    #[error("load failed: {0}")]
    Message(String),
}

impl LoadError {
    /// Create a message-only error.
    pub fn msg(message: impl Into<String>) -> Self {
        LoadError::Message(message.into())
    }
}

// Convenience conversions
impl From<BoxError> for LoadError {
    fn from(err: BoxError) -> Self {
        LoadError::Failed(err)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Failed(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(LoadError::msg("disk full").to_string(), "load failed: disk full");
        let boxed: BoxError = "socket closed".into();
        assert_eq!(LoadError::from(boxed).to_string(), "load failed: socket closed");
    }

    #[test]
    fn test_source_is_kept() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LoadError::from(io);
        assert!(err.source().is_some());
    }
}
