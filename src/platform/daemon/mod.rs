use crate::config::Config;
use crate::diary::DiaryOrchestrator;
use crate::runtime::diagnostics::health;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

mod state;
mod supervisor;

use state::spawn_state_writer;
use supervisor::spawn_supervised_components;

const STATUS_FLUSH_SECONDS: u64 = 5;

pub async fn run(config: Arc<Config>, orchestrator: Arc<DiaryOrchestrator>) -> Result<()> {
    health::mark_component_ok("daemon");

    let mut handles: Vec<JoinHandle<()>> = vec![spawn_state_writer(
        Arc::clone(&config),
        Arc::clone(&orchestrator),
    )];
    handles.extend(spawn_supervised_components(&config, &orchestrator));

    println!("◆ iris-diary daemon started");
    println!(
        "   session '{}', every {} min",
        config.diary.active_session,
        config.diary.interval_minutes.max(1)
    );
    println!("   state file {}", state_file_path(&config).display());
    println!("   Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    health::mark_component_error("daemon", "shutdown requested");
    orchestrator.observer().flush();

    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}

pub fn state_file_path(config: &Config) -> PathBuf {
    state::state_file_path(config)
}
