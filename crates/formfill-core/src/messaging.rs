//! The host-facing message surface.
//!
//! Requests arrive as JSON objects tagged by `action`. A handler that has not
//! been marked ready answers every request with [`MessagingError::NotReady`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use formfill_protocols::dom::Document;
use formfill_protocols::error::MessagingError;
use formfill_protocols::types::FieldDescriptor;

use crate::extract::FrameReport;
use crate::filler::{FillReport, FormFiller};
use crate::usage::UsageReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    FillForm,
    AnalyzeForm,
    CheckIframes,
    #[serde(rename = "getAIStatus")]
    GetAiStatus,
    Ping,
}

impl Request {
    pub fn from_value(value: &Value) -> Result<Self, MessagingError> {
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| MessagingError::UnknownAction(value.to_string()))?;
        serde_json::from_value(json!({ "action": action }))
            .map_err(|_| MessagingError::UnknownAction(action.to_string()))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::FillForm => "fillForm",
            Self::AnalyzeForm => "analyzeForm",
            Self::CheckIframes => "checkIframes",
            Self::GetAiStatus => "getAIStatus",
            Self::Ping => "ping",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Fill(FillReport),
    Fields { fields: Vec<FieldDescriptor> },
    Frames(FrameReport),
    Status { stats: UsageReport },
    Pong { ready: bool, timestamp: i64 },
}

pub struct MessageHandler {
    filler: FormFiller,
    ready: bool,
}

impl MessageHandler {
    pub fn new(filler: FormFiller) -> Self {
        Self {
            filler,
            ready: false,
        }
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn filler(&mut self) -> &mut FormFiller {
        &mut self.filler
    }

    pub async fn handle(
        &mut self,
        request: Request,
        doc: &mut dyn Document,
    ) -> Result<Response, MessagingError> {
        if !self.ready {
            warn!(action = request.action(), "Request before ready");
            return Err(MessagingError::NotReady);
        }
        debug!(action = request.action(), "Handling request");

        match request {
            Request::FillForm => self
                .filler
                .fill(doc)
                .await
                .map(Response::Fill)
                .map_err(|e| MessagingError::Failed(e.to_string())),
            Request::AnalyzeForm => Ok(Response::Fields {
                fields: self.filler.extractor().scan(doc),
            }),
            Request::CheckIframes => Ok(Response::Frames(self.filler.extractor().frame_report(doc))),
            Request::GetAiStatus => Ok(Response::Status {
                stats: self.filler.resolver().usage_report().await,
            }),
            Request::Ping => Ok(Response::Pong {
                ready: true,
                timestamp: self.filler.now().timestamp_millis(),
            }),
        }
    }

    /// Handle a raw JSON request. Errors come back as `{"error": "..."}`.
    pub async fn handle_json(&mut self, raw: &Value, doc: &mut dyn Document) -> Value {
        let outcome = match Request::from_value(raw) {
            Ok(request) => self.handle(request, doc).await,
            Err(e) => Err(e),
        };
        match outcome.and_then(|response| {
            serde_json::to_value(response).map_err(|e| MessagingError::Failed(e.to_string()))
        }) {
            Ok(value) => value,
            Err(e) => json!({ "error": e.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Loading,
    Success,
    Error,
}

/// A user-facing status line for a request or its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Shown while a request is in flight.
    pub fn pending(request: Request) -> Self {
        let text = match request {
            Request::FillForm => "Filling form...",
            Request::AnalyzeForm => "Analyzing form...",
            Request::CheckIframes => "Checking iframes...",
            Request::GetAiStatus => "Loading classifier status...",
            Request::Ping => "Checking page...",
        };
        Self::new(StatusLevel::Loading, text)
    }

    pub fn from_outcome(outcome: &Result<Response, MessagingError>) -> Self {
        use StatusLevel::{Error, Success};

        let response = match outcome {
            Ok(response) => response,
            Err(MessagingError::NotReady) => {
                return Self::new(Error, "Page not ready. Please refresh and try again.");
            }
            Err(e) => return Self::new(Error, e.to_string()),
        };

        match response {
            Response::Fill(report) if report.success => Self::new(
                Success,
                format!(
                    "Form filled successfully! {} fields filled.",
                    report.filled_count
                ),
            ),
            Response::Fill(_) => Self::new(Error, "No forms found or error occurred."),
            Response::Fields { fields } if !fields.is_empty() => {
                Self::new(Success, format!("Found {} form fields.", fields.len()))
            }
            Response::Fields { .. } => Self::new(Error, "No forms found."),
            Response::Frames(report) => {
                let forms = report
                    .frames
                    .iter()
                    .filter(|f| matches!(f.fields, crate::extract::FrameFields::Count(n) if n > 0))
                    .count();
                if forms > 0 {
                    Self::new(Success, format!("Found {} forms in iframes.", forms))
                } else {
                    Self::new(Error, "No forms found in iframes.")
                }
            }
            Response::Status { stats } => {
                let state = if stats.is_configured {
                    "configured"
                } else {
                    "not configured, using fallback rules"
                };
                Self::new(
                    Success,
                    format!(
                        "Classifier {}. {}/{} calls today.",
                        state, stats.stats.daily_calls, stats.max_calls_per_day
                    ),
                )
            }
            Response::Pong { .. } => Self::new(Success, "Page ready."),
        }
    }
}
