#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use iris_diary::diary::context::{
    ActivitySummary, ContextSnapshot, TaskItem, TaskSummary, ToolStatus,
};
use iris_diary::diary::types::{ContextExcerpt, GeneratedEntry};
use iris_diary::diary::{AdmissionDecision, Entry, EntryMode, GenerationService, Register};
use iris_diary::error::GenerationError;

/// Generation double that replays one outcome, optionally after a delay.
pub struct ScriptedGenerator {
    outcome: Result<GeneratedEntry, GenerationError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn replying(title: &str, body: &str, tags: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(GeneratedEntry {
                title: title.to_string(),
                body: body.to_string(),
                tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
            }),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: GenerationError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Never answers within any reasonable timeout.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(GenerationError::Malformed("late".into())),
            delay: Some(Duration::from_secs(3600)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerationService for ScriptedGenerator {
    fn backend(&self) -> &str {
        "scripted"
    }

    fn generate<'a>(
        &'a self,
        _system_instruction: &'a str,
        _user_prompt: &'a str,
        _max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedEntry, GenerationError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        })
    }
}

pub fn task(title: &str) -> TaskItem {
    TaskItem {
        title: title.to_string(),
        due_at: None,
    }
}

/// Overdue work, a fresh completion, one broken tool and a busy session.
pub fn eventful_snapshot() -> ContextSnapshot {
    ContextSnapshot {
        tasks: TaskSummary {
            top_priorities: vec![task("Ship release notes")],
            overdue: vec![task("File taxes")],
            recently_completed: vec![task("Fix login bug")],
        },
        tools: vec![
            ToolStatus {
                name: "calendar".into(),
                healthy: false,
                error_count: 1,
            },
            ToolStatus {
                name: "search".into(),
                healthy: true,
                error_count: 0,
            },
        ],
        activity: ActivitySummary {
            recent_conversation_count: 4,
            recent_errors: vec![],
            recently_used_tools: vec!["search".into()],
        },
        ..ContextSnapshot::default()
    }
}

pub fn entry_at(timestamp: DateTime<Utc>, body: &str) -> Entry {
    Entry {
        id: format!("seed-{}", timestamp.timestamp_micros()),
        timestamp,
        title: "Seed".into(),
        body: body.to_string(),
        mode: EntryMode::Casual,
        register: Register::Active,
        tags: Default::default(),
        session_id: "main".into(),
        context_excerpt: ContextExcerpt::default(),
        admission: AdmissionDecision::manual_override(),
        metadata: Default::default(),
    }
}
