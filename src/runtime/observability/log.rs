use super::traits::{DiaryEvent, DiaryMetric, Observer};
use tracing::{info, warn};

/// Observer that emits every event and metric through `tracing`.
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &DiaryEvent) {
        match event {
            DiaryEvent::SchedulerTick { session_id } => {
                info!(session = %session_id, "diary.tick");
            }
            DiaryEvent::AdmissionRejected { session_id, reason } => {
                info!(session = %session_id, reason = %reason, "diary.admission_rejected");
            }
            DiaryEvent::GenerationFailed {
                session_id,
                kind,
                message,
            } => {
                warn!(session = %session_id, kind = kind, error = %message, "diary.generation_failed");
            }
            DiaryEvent::EntryWritten {
                session_id,
                entry_id,
                mode,
                forced,
                fallback,
            } => {
                info!(
                    session = %session_id,
                    entry = %entry_id,
                    mode = %mode,
                    forced = forced,
                    fallback = fallback,
                    "diary.entry_written"
                );
            }
            DiaryEvent::PersistFailed {
                session_id,
                message,
            } => {
                warn!(session = %session_id, error = %message, "diary.persist_failed");
            }
            DiaryEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn record_metric(&self, metric: &DiaryMetric) {
        match metric {
            DiaryMetric::GenerationLatency(d) => {
                info!(latency_ms = duration_ms(*d), "metric.generation_latency");
            }
            DiaryMetric::NoveltyScore(score) => {
                info!(score = score, "metric.novelty");
            }
            DiaryMetric::RelevanceScore(score) => {
                info!(score = score, "metric.relevance");
            }
            DiaryMetric::HistoryLength { session_id, len } => {
                info!(session = %session_id, len = len, "metric.history_length");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
