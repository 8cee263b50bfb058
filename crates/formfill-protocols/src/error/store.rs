//! Key-value store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = StoreError::from(io_err);
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_serde_error_from() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::from(parse_err);
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
