//! Host messaging errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    /// The receiving side has not finished initializing.
    #[error("Content script not ready")]
    NotReady,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Request failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_display() {
        assert_eq!(MessagingError::NotReady.to_string(), "Content script not ready");
    }

    #[test]
    fn test_unknown_action_display() {
        let err = MessagingError::UnknownAction("dance".to_string());
        assert!(err.to_string().contains("dance"));
    }
}
