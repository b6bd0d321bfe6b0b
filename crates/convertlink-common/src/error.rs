//! Common error types used throughout convertlink.
//!
//! Session operations themselves never fail towards their caller; these
//! errors surface from configuration validation and the optional
//! `Result`-returning session entry points.

/// Common error type for convertlink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport has no established session.
    #[error("Not connected to the conversion service")]
    NotConnected,

    /// The configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "Not connected to the conversion service");

        let err = Error::config("missing broker url");
        assert_eq!(err.to_string(), "Configuration error: missing broker url");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_result_type() {
        fn ok_fn() -> Result<u8> {
            Ok(7)
        }
        assert_eq!(ok_fn().unwrap(), 7);

        fn error_fn() -> Result<u8> {
            Err(Error::NotConnected)
        }
        assert!(error_fn().is_err());
    }
}
