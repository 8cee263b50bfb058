//! The fill pipeline: extract, then resolve and write each field in turn.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use formfill_protocols::dom::Document;
use formfill_protocols::error::ProfileError;
use formfill_protocols::types::{FieldDescriptor, ResolutionSource};

use crate::clock::{Clock, SystemClock};
use crate::context::PageContext;
use crate::extract::FieldExtractor;
use crate::profile::ProfileManager;
use crate::resolve::ValueResolver;
use crate::write::{FieldWriter, WriteOutcome};

pub const NO_FIELDS_MESSAGE: &str = "No form fields found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Filled,
    Skipped,
    Failed,
}

/// What happened to one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub identifier: String,
    pub kind: String,
    pub location: String,
    pub status: FieldStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of the `fillForm` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub success: bool,
    pub filled_count: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldReport>,
}

impl FillReport {
    fn no_fields() -> Self {
        Self {
            success: false,
            filled_count: 0,
            skipped: 0,
            failed: 0,
            message: Some(NO_FIELDS_MESSAGE.to_string()),
            fields: Vec::new(),
        }
    }

    fn push(&mut self, field: &FieldDescriptor, status: FieldStatus) -> &mut FieldReport {
        match status {
            FieldStatus::Filled => self.filled_count += 1,
            FieldStatus::Skipped => self.skipped += 1,
            FieldStatus::Failed => self.failed += 1,
        }
        self.fields.push(FieldReport {
            identifier: field.identifier.clone(),
            kind: field.kind_name().to_string(),
            location: field.source.to_string(),
            status,
            value: None,
            resolution: None,
            error: None,
        });
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }
}

pub struct FormFiller {
    extractor: FieldExtractor,
    resolver: ValueResolver,
    writer: FieldWriter,
    profiles: ProfileManager,
    clock: Arc<dyn Clock>,
    analyze_context: bool,
    auto_fill_delay: Duration,
}

impl FormFiller {
    pub fn new(
        extractor: FieldExtractor,
        resolver: ValueResolver,
        writer: FieldWriter,
        profiles: ProfileManager,
    ) -> Self {
        Self {
            extractor,
            resolver,
            writer,
            profiles,
            clock: Arc::new(SystemClock),
            analyze_context: false,
            auto_fill_delay: Duration::from_millis(2000),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Spend one classification call per fill on the form as a whole.
    pub fn with_form_analysis(mut self, enabled: bool) -> Self {
        self.analyze_context = enabled;
        self
    }

    pub fn with_auto_fill_delay(mut self, delay: Duration) -> Self {
        self.auto_fill_delay = delay;
        self
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub fn resolver(&self) -> &ValueResolver {
        &self.resolver
    }

    pub fn profiles(&self) -> &ProfileManager {
        &self.profiles
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fill every field found in `doc`, one at a time.
    ///
    /// A field that fails to write is logged and counted; the fill goes on.
    pub async fn fill(&mut self, doc: &mut dyn Document) -> Result<FillReport, ProfileError> {
        let mut page = PageContext::from_document(doc);
        let fields = self.extractor.scan(doc);
        if fields.is_empty() {
            info!(url = %page.url, "No form fields found");
            return Ok(FillReport::no_fields());
        }
        info!(url = %page.url, purpose = %page.form_purpose, "Filling {} fields", fields.len());

        let profile = self.profiles.profile_for_filling().await?;

        if self.analyze_context {
            if let Some(analysis) = self.resolver.analyze_form(&fields, &page).await {
                page.analyzed_purpose = Some(analysis.purpose);
            }
        }

        let mut report = FillReport {
            success: true,
            filled_count: 0,
            skipped: 0,
            failed: 0,
            message: None,
            fields: Vec::with_capacity(fields.len()),
        };

        for field in &fields {
            let resolution = self.resolver.resolve(field, &profile, &page).await;
            if resolution.is_empty() {
                debug!(field = %field.identifier, "Nothing to write, skipping");
                report.push(field, FieldStatus::Skipped).resolution = Some(resolution.source);
                continue;
            }

            match self
                .writer
                .write(doc, field, &resolution.value, self.clock.now())
            {
                Ok(WriteOutcome::Written(value)) => {
                    let entry = report.push(field, FieldStatus::Filled);
                    entry.value = Some(value);
                    entry.resolution = Some(resolution.source);
                }
                Ok(WriteOutcome::Untouched) => {
                    report.push(field, FieldStatus::Skipped).resolution = Some(resolution.source);
                }
                Err(e) => {
                    warn!(field = %field.identifier, "Failed to fill field: {}", e);
                    let entry = report.push(field, FieldStatus::Failed);
                    entry.resolution = Some(resolution.source);
                    entry.error = Some(e.to_string());
                }
            }
        }

        info!(
            filled = report.filled_count,
            skipped = report.skipped,
            failed = report.failed,
            "Fill complete"
        );

        if let Err(e) = self
            .profiles
            .track_form_fill(report.filled_count > 0, &site_of(&page.url))
            .await
        {
            warn!("Failed to record fill in profile analytics: {}", e);
        }

        Ok(report)
    }

    /// Fill after the configured delay if the profile has auto-fill on.
    /// Returns `None` when auto-fill is off.
    pub async fn auto_fill(
        &mut self,
        doc: &mut dyn Document,
    ) -> Result<Option<FillReport>, ProfileError> {
        let profile = self.profiles.load().await?;
        if !profile.settings.auto_fill {
            debug!("Auto-fill disabled");
            return Ok(None);
        }
        tokio::time::sleep(self.auto_fill_delay).await;
        self.fill(doc).await.map(Some)
    }

    /// Restore highlights that have run their course.
    pub fn expire_highlights(&mut self, doc: &mut dyn Document) -> usize {
        self.writer.expire_highlights(doc, self.clock.now())
    }

    /// Restore every highlight now, due or not.
    pub fn clear_highlights(&mut self, doc: &mut dyn Document) -> usize {
        self.writer.expire_highlights(doc, DateTime::<Utc>::MAX_UTC)
    }

    pub fn pending_highlights(&self) -> usize {
        self.writer.pending_highlights()
    }
}

/// Host part of a URL, or the input unchanged when it has none.
pub fn site_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| url.to_string())
}
