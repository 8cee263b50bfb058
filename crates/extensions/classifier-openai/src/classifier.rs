//! OpenAI classifier implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use formfill_config::ClassifierConfig;
use formfill_protocols::classifier::{ChatClassifier, ClassificationRequest};
use formfill_protocols::error::ClassifierError;

use crate::api::{ApiMessage, ApiRequest, ApiResponse, ResponseFormat};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Chat-completion classifier backed by the OpenAI API.
pub struct OpenAIClassifier {
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAIClassifier {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, DEFAULT_API_URL.to_string())
    }

    /// Create a classifier with a custom API URL (OpenAI-compatible endpoints).
    pub fn with_url(api_key: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 150,
            temperature: 0.3,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client: build_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from configuration. `None` when no usable key is configured.
    pub fn from_config(config: &ClassifierConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let api_key = config.api_key.clone()?;
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Some(Self {
            api_key,
            api_url,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_seconds,
            client: build_client(config.timeout_seconds),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &ClassificationRequest) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: vec![
                ApiMessage::system(request.system.clone()),
                ApiMessage::user(request.prompt.clone()),
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            response_format: Some(ResponseFormat::json_object()),
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ClassifierError> {
        let response = self
            .client
            .post(&self.api_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::from_status(status, text));
        }

        Ok(response)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout(self.timeout_secs)
        } else {
            ClassifierError::Network(err.to_string())
        }
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    match reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            // Requests still carry the timeout individually.
            warn!("Failed to build HTTP client, using defaults: {}", e);
            reqwest::Client::new()
        }
    }
}

#[async_trait]
impl ChatClassifier for OpenAIClassifier {
    fn id(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: ClassificationRequest) -> Result<String, ClassifierError> {
        let api_request = self.build_request(&request);
        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &api_response.usage {
            debug!(
                model = %api_response.model,
                total_tokens = usage.total_tokens,
                "Classification call completed"
            );
        }

        api_response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| ClassifierError::MalformedResponse("no message content".to_string()))
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
