//! Classifier protocol definitions.
//!
//! A classifier is an external chat-completion endpoint. The pipeline sends a
//! system message and a user prompt and expects a JSON object back as text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// One classification call: a system message plus a user prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub system: String,
    pub prompt: String,
}

impl ClassificationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

/// Core trait for classification backends.
#[async_trait]
pub trait ChatClassifier: Send + Sync {
    /// Returns the classifier ID.
    fn id(&self) -> &str;

    /// Send one request and return the raw message content of the reply.
    async fn complete(&self, request: ClassificationRequest) -> Result<String, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ChatClassifier for Echo {
        fn id(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: ClassificationRequest) -> Result<String, ClassifierError> {
            Ok(request.prompt)
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let classifier: Box<dyn ChatClassifier> = Box::new(Echo);
        let reply = classifier
            .complete(ClassificationRequest::new("sys", "{\"value\":\"x\"}"))
            .await
            .unwrap();
        assert_eq!(reply, "{\"value\":\"x\"}");
        assert_eq!(classifier.id(), "echo");
    }
}
