//! Profile command handlers.

use std::path::Path;

use formfill_config::Config;
use formfill_core::ProfileManager;

use crate::cli::ProfileAction;
use crate::pipeline;

pub(crate) async fn handle_profile_command(
    config: &Config,
    state: Option<&Path>,
    action: ProfileAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = pipeline::open_store(config, state).await?;
    let profiles = ProfileManager::new(store);

    match action {
        ProfileAction::Show { json } => {
            let profile = profiles.load().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
                return Ok(());
            }

            if !profile.has_identity() {
                println!("No profile stored yet. Fills will use demo data.");
                println!("Import one with: formfill profile import <file>");
                return Ok(());
            }

            let summary = profile.summary();
            let rows = [
                ("Name", summary.full_name.as_str()),
                ("Email", summary.email.as_str()),
                ("Phone", summary.phone.as_str()),
                ("City", summary.city.as_str()),
                ("Country", summary.country.as_str()),
                ("Job title", summary.job_title.as_str()),
                ("Company", summary.company.as_str()),
            ];
            for (label, value) in rows {
                println!("{:<16} {}", format!("{}:", label), value);
            }
            println!(
                "{:<16} {} ({} successful)",
                "Forms filled:",
                profile.analytics.total_forms_filled,
                profile.analytics.successful_fills
            );
            if !profile.analytics.favorite_sites.is_empty() {
                println!(
                    "{:<16} {}",
                    "Recent sites:",
                    profile.analytics.favorite_sites.join(", ")
                );
            }
            println!("{:<16} {}%", "Completion:", profile.completion_score());
        }

        ProfileAction::Export { output } => {
            let json = profiles.export().await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    println!("Profile exported to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        ProfileAction::Import { file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let profile = profiles.import(&raw).await?;
            println!(
                "Imported profile for '{}' ({}% complete)",
                profile.full_name(),
                profile.completion_score()
            );
        }

        ProfileAction::Score => {
            let profile = profiles.load().await?;
            println!("{}%", profile.completion_score());
        }
    }

    Ok(())
}
