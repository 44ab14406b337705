//! Periodic background attempts for the configured active session.

use super::orchestrator::DiaryOrchestrator;
use crate::runtime::diagnostics::health;
use crate::runtime::observability::DiaryEvent;
use std::sync::Arc;
use tokio::time::Duration;

pub const COMPONENT: &str = "diary";
const MIN_INTERVAL_MINUTES: u32 = 1;

/// What a single scheduled cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Written { entry_id: String },
    Skipped,
    Failed { message: String },
}

pub fn tick_period(interval_minutes: u32) -> Duration {
    Duration::from_secs(u64::from(interval_minutes.max(MIN_INTERVAL_MINUTES)) * 60)
}

/// Runs one attempt in its own task. Errors and panics are logged and
/// recorded in component health; they never reach the caller.
pub async fn run_cycle(orchestrator: &Arc<DiaryOrchestrator>) -> CycleOutcome {
    let session_id = orchestrator.config().active_session.clone();
    orchestrator.observer().record_event(&DiaryEvent::SchedulerTick {
        session_id: session_id.clone(),
    });

    let worker = Arc::clone(orchestrator);
    let session = session_id.clone();
    let joined = tokio::spawn(async move { worker.attempt_entry(&session).await }).await;

    let message = match joined {
        Ok(Ok(Some(entry))) => {
            health::mark_component_ok(COMPONENT);
            return CycleOutcome::Written { entry_id: entry.id };
        }
        Ok(Ok(None)) => {
            health::mark_component_ok(COMPONENT);
            return CycleOutcome::Skipped;
        }
        Ok(Err(error)) => {
            tracing::warn!(session_id = %session_id, error = %error, "diary cycle failed");
            error.to_string()
        }
        Err(join_error) if join_error.is_panic() => {
            tracing::error!(session_id = %session_id, "diary cycle panicked");
            "diary cycle panicked".to_string()
        }
        Err(join_error) => {
            tracing::warn!(session_id = %session_id, error = %join_error, "diary cycle cancelled");
            join_error.to_string()
        }
    };

    health::mark_component_error(COMPONENT, &message);
    orchestrator.observer().record_event(&DiaryEvent::Error {
        component: COMPONENT.to_string(),
        message: message.clone(),
    });
    CycleOutcome::Failed { message }
}

/// Worker body hosted by the daemon supervisor. Never returns on its own.
pub async fn run_diary_worker(orchestrator: Arc<DiaryOrchestrator>) -> anyhow::Result<()> {
    let period = tick_period(orchestrator.config().interval_minutes);
    run_worker_loop(orchestrator, period).await
}

async fn run_worker_loop(
    orchestrator: Arc<DiaryOrchestrator>,
    period: Duration,
) -> anyhow::Result<()> {
    tracing::info!(
        session_id = %orchestrator.config().active_session,
        period_secs = period.as_secs(),
        "diary worker started"
    );
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let outcome = run_cycle(&orchestrator).await;
        tracing::debug!(?outcome, "diary cycle finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiaryConfig;
    use crate::diary::context::{
        ContextAggregator, ContextSnapshot, StaticContextAggregator, TaskItem, TaskSummary,
    };
    use crate::diary::generation::GenerationService;
    use crate::diary::store::{EntryStore, InMemoryEntryStore};
    use crate::diary::types::GeneratedEntry;
    use crate::error::{ContextError, GenerationError};
    use std::future::Future;
    use std::pin::Pin;

    struct CannedGenerator;

    impl GenerationService for CannedGenerator {
        fn backend(&self) -> &str {
            "canned"
        }

        fn generate<'a>(
            &'a self,
            _system_instruction: &'a str,
            _user_prompt: &'a str,
            _max_tokens: u32,
        ) -> Pin<Box<dyn Future<Output = Result<GeneratedEntry, GenerationError>> + Send + 'a>>
        {
            Box::pin(async {
                Ok(GeneratedEntry {
                    title: "Tick".into(),
                    body: "Overdue work is still waiting.".into(),
                    tags: vec![],
                })
            })
        }
    }

    struct PanickingAggregator;

    fn explode() -> Result<ContextSnapshot, ContextError> {
        panic!("aggregator exploded")
    }

    impl ContextAggregator for PanickingAggregator {
        fn name(&self) -> &str {
            "panicking"
        }

        fn aggregate<'a>(
            &'a self,
            _session_id: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<ContextSnapshot, ContextError>> + Send + 'a>>
        {
            Box::pin(async { explode() })
        }
    }

    struct BrokenAggregator;

    impl ContextAggregator for BrokenAggregator {
        fn name(&self) -> &str {
            "broken"
        }

        fn aggregate<'a>(
            &'a self,
            _session_id: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<ContextSnapshot, ContextError>> + Send + 'a>>
        {
            Box::pin(async { Err(ContextError::Decode("bad snapshot".into())) })
        }
    }

    fn busy_snapshot() -> ContextSnapshot {
        ContextSnapshot {
            tasks: TaskSummary {
                overdue: vec![TaskItem {
                    title: "File taxes".into(),
                    due_at: None,
                }],
                ..TaskSummary::default()
            },
            ..ContextSnapshot::default()
        }
    }

    fn orchestrator_with(
        config: DiaryConfig,
        aggregator: Arc<dyn ContextAggregator>,
        store: Arc<InMemoryEntryStore>,
    ) -> Arc<DiaryOrchestrator> {
        Arc::new(DiaryOrchestrator::new(
            config,
            aggregator,
            Arc::new(CannedGenerator),
            store,
        ))
    }

    #[test]
    fn period_has_one_minute_floor() {
        assert_eq!(tick_period(0), Duration::from_secs(60));
        assert_eq!(tick_period(1), Duration::from_secs(60));
        assert_eq!(tick_period(5), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn cycle_writes_then_skips_inside_cooldown() {
        let store = Arc::new(InMemoryEntryStore::new());
        let orchestrator = orchestrator_with(
            DiaryConfig::default(),
            Arc::new(StaticContextAggregator::new(busy_snapshot())),
            store.clone(),
        );

        assert!(matches!(
            run_cycle(&orchestrator).await,
            CycleOutcome::Written { .. }
        ));
        assert_eq!(run_cycle(&orchestrator).await, CycleOutcome::Skipped);
        assert_eq!(store.list("main", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cycle_error_is_contained() {
        let orchestrator = orchestrator_with(
            DiaryConfig::default(),
            Arc::new(BrokenAggregator),
            Arc::new(InMemoryEntryStore::new()),
        );

        let CycleOutcome::Failed { message } = run_cycle(&orchestrator).await else {
            panic!("expected a failed cycle");
        };
        assert!(message.contains("bad snapshot"));
    }

    #[tokio::test]
    async fn cycle_panic_is_contained_and_loop_survives() {
        let orchestrator = orchestrator_with(
            DiaryConfig::default(),
            Arc::new(PanickingAggregator),
            Arc::new(InMemoryEntryStore::new()),
        );

        for _ in 0..2 {
            assert_eq!(
                run_cycle(&orchestrator).await,
                CycleOutcome::Failed {
                    message: "diary cycle panicked".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn worker_loop_ticks_immediately() {
        let store = Arc::new(InMemoryEntryStore::new());
        let orchestrator = orchestrator_with(
            DiaryConfig::default(),
            Arc::new(StaticContextAggregator::new(busy_snapshot())),
            store.clone(),
        );

        let handle = tokio::spawn(run_worker_loop(orchestrator, Duration::from_millis(20)));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();
        let _ = handle.await;

        // later ticks land inside the cooldown
        assert_eq!(store.list("main", 10).await.unwrap().len(), 1);
    }
}
