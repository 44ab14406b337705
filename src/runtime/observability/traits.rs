use crate::diary::types::{EntryMode, ReasonCode};
use std::time::Duration;

/// Discrete diary lifecycle events.
#[derive(Debug, Clone, PartialEq)]
pub enum DiaryEvent {
    SchedulerTick {
        session_id: String,
    },
    AdmissionRejected {
        session_id: String,
        reason: ReasonCode,
    },
    GenerationFailed {
        session_id: String,
        kind: &'static str,
        message: String,
    },
    EntryWritten {
        session_id: String,
        entry_id: String,
        mode: EntryMode,
        forced: bool,
        fallback: bool,
    },
    PersistFailed {
        session_id: String,
        message: String,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Numeric diary metrics
#[derive(Debug, Clone, PartialEq)]
pub enum DiaryMetric {
    GenerationLatency(Duration),
    NoveltyScore(f64),
    RelevanceScore(f64),
    HistoryLength { session_id: String, len: u64 },
}

pub trait Observer: Send + Sync {
    fn record_event(&self, event: &DiaryEvent);

    fn record_metric(&self, metric: &DiaryMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    fn name(&self) -> &str;
}
