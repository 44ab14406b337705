use crate::config::Config;
use crate::diary::GovernorStatus;
use crate::runtime::diagnostics::health::HealthSnapshot;

pub fn render_status(
    config: &Config,
    session_id: &str,
    governor: &GovernorStatus,
    health: &HealthSnapshot,
) -> String {
    let diary = &config.diary;
    let mut lines = vec![
        "◆ iris-diary status".to_string(),
        String::new(),
        format!("  Version     {}", env!("CARGO_PKG_VERSION")),
        format!("  Workspace   {}", config.workspace_dir.display()),
        format!("  Config      {}", config.config_path.display()),
        String::new(),
        format!("  Provider    {}", config.provider_name()),
        format!("  Model       {}", config.model_name()),
        format!("  Store       {}", config.store.backend),
        format!("  Observer    {}", config.observability.backend),
        String::new(),
        format!(
            "  Diary       {} (every {} min, session '{}')",
            if diary.enabled { "enabled" } else { "disabled" },
            diary.interval_minutes.max(1),
            diary.active_session
        ),
        format!(
            "  Limits      max_words={}, history_cap={}, timeout={}s",
            diary.max_words, diary.history_cap, diary.generation_timeout_secs
        ),
        String::new(),
        format!("  Governor    session '{session_id}'"),
        format!(
            "    cooldown        {}s, at most {}/hour",
            governor.config.min_interval_seconds, governor.config.max_entries_per_hour
        ),
        format!(
            "    thresholds      novelty {:.2}, relevance {:.2}",
            governor.config.novelty_threshold, governor.config.relevance_threshold
        ),
        format!(
            "    last hour       {} entr{}{}",
            governor.recent_hour_count,
            if governor.recent_hour_count == 1 { "y" } else { "ies" },
            if governor.rate_limited {
                " (rate limited)"
            } else {
                ""
            }
        ),
        format!(
            "    last entry      {}",
            governor
                .last_entry_at
                .map_or_else(|| "never".to_string(), |at| at.to_rfc3339())
        ),
        format!(
            "    next eligible   {}",
            governor
                .next_eligible_at
                .map_or_else(|| "now".to_string(), |at| at.to_rfc3339())
        ),
    ];

    if !health.components.is_empty() {
        lines.push(String::new());
        lines.push("  Components".to_string());
        for (name, component) in &health.components {
            let detail = component
                .last_error
                .as_deref()
                .map(|error| format!(" - {error}"))
                .unwrap_or_default();
            lines.push(format!("    {name:<14}  {}{detail}", component.status));
        }
    }

    lines.join("\n")
}
