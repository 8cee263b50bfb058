//! Page command handlers: fill, analyze, frames, stats, ping.

use std::path::{Path, PathBuf};

use tracing::info;

use formfill_config::Config;
use formfill_core::{
    FieldStatus, FillReport, MessageHandler, PageSnapshot, Request, Response, StatusLevel,
    StatusMessage,
};
use formfill_protocols::MessagingError;
use formfill_protocols::types::ResolutionSource;

use crate::pipeline;

pub(crate) async fn load_page(path: &Path) -> Result<PageSnapshot, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(PageSnapshot::from_json(&raw)?)
}

/// Run one request against a page and print the status line.
async fn run(
    handler: &mut MessageHandler,
    request: Request,
    page: &mut PageSnapshot,
) -> Result<Response, Box<dyn std::error::Error>> {
    let pending = StatusMessage::pending(request);
    info!("{}", pending.text);

    let outcome = handler.handle(request, page).await;
    print_status(&StatusMessage::from_outcome(&outcome));
    Ok(outcome?)
}

fn print_status(status: &StatusMessage) {
    let marker = match status.level {
        StatusLevel::Loading => "..",
        StatusLevel::Success => "ok",
        StatusLevel::Error => "!!",
    };
    println!("[{}] {}", marker, status.text);
}

pub(crate) async fn handle_fill_command(
    config: &Config,
    state: Option<&Path>,
    page_path: PathBuf,
    output: Option<PathBuf>,
    auto: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = pipeline::build_handler(config, state).await?;
    let mut page = load_page(&page_path).await?;

    let report = if auto {
        match handler.filler().auto_fill(&mut page).await? {
            Some(report) => report,
            None => {
                println!("Auto-fill is turned off in the profile settings.");
                return Ok(());
            }
        }
    } else {
        match run(&mut handler, Request::FillForm, &mut page).await? {
            Response::Fill(report) => report,
            other => return Err(unexpected(other)),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_fill_report(&report);
    }

    let cleared = handler.filler().clear_highlights(&mut page);
    if cleared > 0 {
        info!("Cleared {} highlights", cleared);
    }

    if let Some(output) = output {
        tokio::fs::write(&output, serde_json::to_string_pretty(&page)?).await?;
        println!("Filled page written to {}", output.display());
    }

    Ok(())
}

fn print_fill_report(report: &FillReport) {
    if let Some(message) = &report.message {
        println!("{}", message);
        return;
    }

    println!(
        "{:<24} {:<10} {:<10} {:<8} {:<24} {}",
        "FIELD", "TYPE", "LOCATION", "STATUS", "SOURCE", "VALUE"
    );
    println!("{}", "-".repeat(100));
    for field in &report.fields {
        let status = match field.status {
            FieldStatus::Filled => "filled",
            FieldStatus::Skipped => "skipped",
            FieldStatus::Failed => "failed",
        };
        let detail = field
            .error
            .as_deref()
            .or(field.value.as_deref())
            .unwrap_or("-");
        println!(
            "{:<24} {:<10} {:<10} {:<8} {:<24} {}",
            truncate(&field.identifier, 24),
            field.kind,
            field.location,
            status,
            field.resolution.as_ref().map(source_label).unwrap_or_default(),
            truncate(detail, 40)
        );
    }
    println!();
    println!(
        "Filled: {}  Skipped: {}  Failed: {}",
        report.filled_count, report.skipped, report.failed
    );
}

fn source_label(source: &ResolutionSource) -> String {
    match source {
        ResolutionSource::Classifier => "classifier".to_string(),
        ResolutionSource::Rule(name) => format!("rule:{}", name),
        ResolutionSource::ContextualOption(name) => format!("option:{}", name),
        ResolutionSource::FirstOption => "first-option".to_string(),
        ResolutionSource::Default => "default".to_string(),
        ResolutionSource::NoOptions => "no-options".to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

pub(crate) async fn handle_analyze_command(
    config: &Config,
    state: Option<&Path>,
    page_path: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = pipeline::build_handler(config, state).await?;
    let mut page = load_page(&page_path).await?;

    let fields = match run(&mut handler, Request::AnalyzeForm, &mut page).await? {
        Response::Fields { fields } => fields,
        other => return Err(unexpected(other)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:<10} {:<8} {}",
        "FIELD", "TYPE", "LOCATION", "REQUIRED", "LABEL"
    );
    println!("{}", "-".repeat(80));
    for field in &fields {
        println!(
            "{:<24} {:<10} {:<10} {:<8} {}",
            truncate(&field.identifier, 24),
            field.kind_name(),
            field.source.to_string(),
            if field.required { "yes" } else { "no" },
            truncate(&field.label, 30)
        );
    }
    Ok(())
}

pub(crate) async fn handle_frames_command(
    config: &Config,
    state: Option<&Path>,
    page_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = pipeline::build_handler(config, state).await?;
    let mut page = load_page(&page_path).await?;

    let response = run(&mut handler, Request::CheckIframes, &mut page).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub(crate) async fn handle_stats_command(
    config: &Config,
    state: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = pipeline::build_handler(config, state).await?;
    let mut page = PageSnapshot::default();

    let stats = match run(&mut handler, Request::GetAiStatus, &mut page).await? {
        Response::Status { stats } => stats,
        other => return Err(unexpected(other)),
    };

    println!("{:<24} {}", "Configured:", stats.is_configured);
    println!("{:<24} {}", "Total calls:", stats.stats.total_calls);
    println!("{:<24} {}", "Successful:", stats.stats.successful_calls);
    println!("{:<24} {}", "Failed:", stats.stats.failed_calls);
    println!(
        "{:<24} {}/{}",
        "Today:", stats.stats.daily_calls, stats.max_calls_per_day
    );
    println!(
        "{:<24} {}/{}",
        "This minute:", stats.rate_limit.calls_this_minute, stats.max_calls_per_minute
    );
    if let Some(last) = stats.stats.last_call_time {
        println!("{:<24} {}", "Last call:", last.to_rfc3339());
    }
    Ok(())
}

pub(crate) async fn handle_ping_command(
    config: &Config,
    state: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut handler = pipeline::build_handler(config, state).await?;
    let mut page = PageSnapshot::default();

    let response = run(&mut handler, Request::Ping, &mut page).await?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn unexpected(response: Response) -> Box<dyn std::error::Error> {
    Box::new(MessagingError::Failed(format!(
        "unexpected response: {:?}",
        response
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_really_long_identifier", 10), "a_reall...");
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label(&ResolutionSource::Rule("email".into())), "rule:email");
        assert_eq!(source_label(&ResolutionSource::FirstOption), "first-option");
    }

    #[tokio::test]
    async fn test_load_page_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(load_page(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_fill_demo_page_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let output = dir.path().join("filled.json");
        let demo = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/contact_page.json");

        handle_fill_command(
            &Config::default(),
            Some(&state),
            demo,
            Some(output.clone()),
            false,
            false,
        )
        .await
        .unwrap();

        let filled: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&output).await.unwrap()).unwrap();
        assert!(!filled["mutations"].as_array().unwrap().is_empty());
    }
}
