use super::traits::{DiaryEvent, DiaryMetric, Observer};

/// Zero-overhead observer — all methods compile to nothing
pub struct NoopObserver;

impl Observer for NoopObserver {
    #[inline(always)]
    fn record_event(&self, _event: &DiaryEvent) {}

    #[inline(always)]
    fn record_metric(&self, _metric: &DiaryMetric) {}

    fn name(&self) -> &str {
        "noop"
    }
}
