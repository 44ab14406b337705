use crate::config::{Config, ReliabilityConfig};
use crate::diary::DiaryOrchestrator;
use crate::runtime::diagnostics::health;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Restart policy shared by every supervised component.
#[derive(Debug, Clone, Copy)]
pub(super) struct RestartPolicy {
    initial_backoff: Duration,
    max_backoff: Duration,
    /// 0 means unlimited.
    max_restarts: u32,
}

impl RestartPolicy {
    pub(super) fn from_config(reliability: &ReliabilityConfig) -> Self {
        let initial = reliability.component_initial_backoff_secs.max(1);
        Self {
            initial_backoff: Duration::from_secs(initial),
            max_backoff: Duration::from_secs(reliability.component_max_backoff_secs.max(initial)),
            max_restarts: reliability.component_max_restarts,
        }
    }

    #[cfg(test)]
    fn immediate(max_restarts: u32) -> Self {
        Self {
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
            max_restarts,
        }
    }
}

pub(super) fn spawn_component_supervisor<F, Fut>(
    name: &'static str,
    policy: RestartPolicy,
    mut run_component: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut backoff = policy.initial_backoff;
        let mut consecutive_failures: u32 = 0;

        loop {
            tracing::info!(component = name, "daemon component starting");
            match run_component().await {
                Ok(()) => {
                    tracing::warn!(component = name, "daemon component exited unexpectedly");
                    health::mark_component_error(name, "component exited unexpectedly");
                    backoff = policy.initial_backoff;
                }
                Err(error) => {
                    tracing::error!(component = name, %error, "daemon component failed");
                    health::mark_component_error(name, &error);
                }
            }
            consecutive_failures = consecutive_failures.saturating_add(1);

            if policy.max_restarts > 0 && consecutive_failures > policy.max_restarts {
                tracing::error!(
                    component = name,
                    max_restarts = policy.max_restarts,
                    "daemon component exceeded max restarts, circuit open"
                );
                break;
            }
            health::bump_component_restart(name);
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2).min(policy.max_backoff);
        }
    })
}

/// Starts every background component the daemon hosts. The diary worker is
/// only started when the orchestrator's diary is enabled.
pub(super) fn spawn_supervised_components(
    config: &Config,
    orchestrator: &Arc<DiaryOrchestrator>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    if orchestrator.config().enabled {
        let policy = RestartPolicy::from_config(&config.reliability);
        let diary = Arc::clone(orchestrator);
        handles.push(spawn_component_supervisor(
            crate::diary::scheduler::COMPONENT,
            policy,
            move || {
                let orchestrator = Arc::clone(&diary);
                async move { crate::diary::run_diary_worker(orchestrator).await }
            },
        ));
    } else {
        tracing::info!("diary disabled; background worker not supervised");
    }

    handles
}
