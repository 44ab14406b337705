use crate::error::ContextError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    #[serde(default)]
    pub top_priorities: Vec<TaskItem>,
    #[serde(default)]
    pub overdue: Vec<TaskItem>,
    #[serde(default)]
    pub recently_completed: Vec<TaskItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatus {
    pub name: String,
    #[serde(default = "default_true")]
    pub healthy: bool,
    #[serde(default)]
    pub error_count: u32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    #[serde(default)]
    pub recent_conversation_count: u32,
    #[serde(default)]
    pub recent_errors: Vec<String>,
    #[serde(default)]
    pub recently_used_tools: Vec<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SystemHealth {
    #[default]
    Good,
    Degraded,
    Poor,
}

/// Point-in-time, read-only view of the assistant's surroundings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: TaskSummary,
    #[serde(default)]
    pub tools: Vec<ToolStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_event: Option<CalendarEvent>,
    #[serde(default)]
    pub activity: ActivitySummary,
    /// Explicit health reported by the aggregator; derived from tools when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_health: Option<SystemHealth>,
}

impl ContextSnapshot {
    pub fn empty(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            captured_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn unhealthy_tools(&self) -> impl Iterator<Item = &ToolStatus> {
        self.tools.iter().filter(|tool| !tool.healthy)
    }

    pub fn has_errors(&self) -> bool {
        !self.activity.recent_errors.is_empty() || self.tools.iter().any(|t| t.error_count > 0)
    }

    pub fn health(&self) -> SystemHealth {
        if let Some(explicit) = self.system_health {
            return explicit;
        }

        let unhealthy = self.unhealthy_tools().count();
        if unhealthy == 0 {
            SystemHealth::Good
        } else if unhealthy * 2 <= self.tools.len() {
            SystemHealth::Degraded
        } else {
            SystemHealth::Poor
        }
    }
}

/// Source of context snapshots. Read-only from the diary's perspective.
pub trait ContextAggregator: Send + Sync {
    fn name(&self) -> &str;

    fn aggregate<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ContextSnapshot, ContextError>> + Send + 'a>>;
}

/// Returns the same snapshot for every session.
pub struct StaticContextAggregator {
    snapshot: ContextSnapshot,
}

impl StaticContextAggregator {
    pub fn new(snapshot: ContextSnapshot) -> Self {
        Self { snapshot }
    }
}

impl ContextAggregator for StaticContextAggregator {
    fn name(&self) -> &str {
        "static"
    }

    fn aggregate<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ContextSnapshot, ContextError>> + Send + 'a>> {
        Box::pin(async move {
            let mut snapshot = self.snapshot.clone();
            snapshot.session_id = session_id.to_string();
            if snapshot.captured_at.is_none() {
                snapshot.captured_at = Some(Utc::now());
            }
            Ok(snapshot)
        })
    }
}

/// Reads `<workspace>/context/<session>.json`, written by the surrounding
/// assistant. A missing file is an empty snapshot, not an error.
pub struct WorkspaceContextAggregator {
    context_dir: PathBuf,
}

impl WorkspaceContextAggregator {
    pub fn new(workspace_dir: &std::path::Path) -> Self {
        Self {
            context_dir: workspace_dir.join("context"),
        }
    }

    fn snapshot_path(&self, session_id: &str) -> PathBuf {
        let file_stem: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.context_dir.join(format!("{file_stem}.json"))
    }
}

impl ContextAggregator for WorkspaceContextAggregator {
    fn name(&self) -> &str {
        "workspace"
    }

    fn aggregate<'a>(
        &'a self,
        session_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ContextSnapshot, ContextError>> + Send + 'a>> {
        Box::pin(async move {
            let path = self.snapshot_path(session_id);
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "no context snapshot; using empty");
                    return Ok(ContextSnapshot::empty(session_id));
                }
                Err(error) => {
                    return Err(ContextError::Aggregation {
                        session_id: session_id.to_string(),
                        message: format!("failed reading {}: {error}", path.display()),
                    });
                }
            };

            let mut snapshot: ContextSnapshot = serde_json::from_str(&raw)
                .map_err(|error| ContextError::Decode(format!("{}: {error}", path.display())))?;
            snapshot.session_id = session_id.to_string();
            if snapshot.captured_at.is_none() {
                snapshot.captured_at = Some(Utc::now());
            }
            Ok(snapshot)
        })
    }
}
