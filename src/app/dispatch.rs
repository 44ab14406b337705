use crate::app::build_orchestrator;
use crate::app::status::render_status;
use crate::cli::commands::{Cli, Commands};
use crate::config::Config;
use crate::diary::Entry;
use anyhow::{Context, Result};
use std::sync::Arc;

fn print_entries(entries: &[Entry], empty_message: &str) -> Result<()> {
    if entries.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(entries).context("Failed to render entries")?
    );
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    let session = cli
        .session
        .clone()
        .unwrap_or_else(|| config.diary.active_session.clone());

    let orchestrator = build_orchestrator(&config).await?;

    match cli.command {
        Commands::Daemon => crate::platform::daemon::run(config, orchestrator).await,
        Commands::Attempt => match orchestrator.attempt_entry(&session).await? {
            Some(entry) => print_entries(&[entry], ""),
            None => {
                let governor = orchestrator.governor_status(&session).await;
                println!("No entry written for session '{session}'.");
                if let Some(next) = governor.next_eligible_at {
                    println!("Next eligible at {}", next.to_rfc3339());
                }
                Ok(())
            }
        },
        Commands::Force { mode } => {
            let entry = orchestrator.force_entry(&session, mode).await?;
            print_entries(&[entry], "")
        }
        Commands::List { limit } => {
            let entries = orchestrator.recent_entries(&session, limit).await;
            print_entries(
                &entries,
                &format!("No diary entries for session '{session}'."),
            )
        }
        Commands::Search { query, limit } => {
            let entries = orchestrator.search(&session, &query, limit).await;
            print_entries(&entries, &format!("No entries match '{query}'."))
        }
        Commands::Status => {
            let governor = orchestrator.governor_status(&session).await;
            let health = crate::runtime::diagnostics::health::snapshot();
            println!("{}", render_status(&config, &session, &governor, &health));
            Ok(())
        }
    }
}
