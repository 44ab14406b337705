pub mod log;
pub mod noop;
pub mod traits;

pub use self::log::LogObserver;
pub use noop::NoopObserver;
pub use traits::{DiaryEvent, DiaryMetric, Observer};

use crate::config::ObservabilityConfig;

/// Build the observer named by `[observability].backend`.
pub fn create_observer(config: &ObservabilityConfig) -> Box<dyn Observer> {
    match config.backend.trim().to_ascii_lowercase().as_str() {
        "log" => Box::new(LogObserver::new()),
        "none" | "noop" => Box::new(NoopObserver),
        other => {
            tracing::warn!(backend = %other, "unknown observability backend; falling back to noop");
            Box::new(NoopObserver)
        }
    }
}
