use crate::config::Config;
use crate::diary::{DiaryOrchestrator, GovernorStatus};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

#[derive(Debug, Clone, serde::Serialize)]
pub(super) struct DaemonStatus {
    #[serde(flatten)]
    snapshot: serde_json::Map<String, serde_json::Value>,
    active_session: String,
    governor: GovernorStatus,
    written_at: String,
}

pub(super) fn state_file_path(config: &Config) -> PathBuf {
    config
        .config_path
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join("daemon_state.json")
}

async fn render_state(config: &Config, orchestrator: &DiaryOrchestrator) -> serde_json::Value {
    let json = crate::runtime::diagnostics::health::snapshot_json();
    let Some(snapshot) = json.as_object().cloned() else {
        return json;
    };

    let session = &config.diary.active_session;
    let status = DaemonStatus {
        snapshot,
        active_session: session.clone(),
        governor: orchestrator.governor_status(session).await,
        written_at: Utc::now().to_rfc3339(),
    };
    serde_json::to_value(status).unwrap_or_else(|_| serde_json::json!({}))
}

pub(super) fn spawn_state_writer(
    config: Arc<Config>,
    orchestrator: Arc<DiaryOrchestrator>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let path = state_file_path(&config);
        if let Some(parent) = path.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!(%error, "failed to create state file directory");
        }

        let mut interval = tokio::time::interval(Duration::from_secs(super::STATUS_FLUSH_SECONDS));
        loop {
            interval.tick().await;
            let json = render_state(&config, &orchestrator).await;
            let data = serde_json::to_vec_pretty(&json).unwrap_or_else(|_| b"{}".to_vec());
            if let Err(error) = tokio::fs::write(&path, data).await {
                tracing::warn!(%error, path = %path.display(), "failed to write daemon state file");
            }
        }
    })
}
