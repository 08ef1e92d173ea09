use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::{FactoryMetricsSnapshot, InternMetricsSnapshot};
use crate::metrics::traits::{FactoryMetricsRecorder, InternMetricsRecorder};

#[derive(Debug, Default)]
pub struct InternMetrics {
    pub intern_calls: MetricsCell,
    pub intern_hits: MetricsCell,
    pub intern_misses: MetricsCell,
    pub lookup_calls: MetricsCell,
    pub lookup_hits: MetricsCell,
}

impl InternMetrics {
    pub fn snapshot(&self, distinct_values: usize) -> InternMetricsSnapshot {
        InternMetricsSnapshot {
            intern_calls: self.intern_calls.get(),
            intern_hits: self.intern_hits.get(),
            intern_misses: self.intern_misses.get(),
            lookup_calls: self.lookup_calls.get(),
            lookup_hits: self.lookup_hits.get(),
            distinct_values,
        }
    }

    pub fn reset(&self) {
        self.intern_calls.reset();
        self.intern_hits.reset();
        self.intern_misses.reset();
        self.lookup_calls.reset();
        self.lookup_hits.reset();
    }
}

impl InternMetricsRecorder for InternMetrics {
    fn record_intern_hit(&self) {
        self.intern_calls.incr();
        self.intern_hits.incr();
    }

    fn record_intern_miss(&self) {
        self.intern_calls.incr();
        self.intern_misses.incr();
    }

    fn record_lookup_call(&self) {
        self.lookup_calls.incr();
    }

    fn record_lookup_hit(&self) {
        self.lookup_hits.incr();
    }
}

#[derive(Debug, Default)]
pub struct FactoryMetrics {
    pub contexts_created: MetricsCell,
    pub contexts_rejected: MetricsCell,
    pub contexts_removed: MetricsCell,
}

impl FactoryMetrics {
    pub fn snapshot(&self, live_contexts: usize, distinct_shared: usize) -> FactoryMetricsSnapshot {
        FactoryMetricsSnapshot {
            contexts_created: self.contexts_created.get(),
            contexts_rejected: self.contexts_rejected.get(),
            contexts_removed: self.contexts_removed.get(),
            live_contexts,
            distinct_shared,
        }
    }

    pub fn reset(&self) {
        self.contexts_created.reset();
        self.contexts_rejected.reset();
        self.contexts_removed.reset();
    }
}

impl FactoryMetricsRecorder for FactoryMetrics {
    fn record_context_created(&self) {
        self.contexts_created.incr();
    }

    fn record_context_rejected(&self) {
        self.contexts_rejected.incr();
    }

    fn record_context_removed(&self) {
        self.contexts_removed.incr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_hits_and_misses_both_count_as_calls() {
        let metrics = InternMetrics::default();
        metrics.record_intern_miss();
        metrics.record_intern_hit();
        metrics.record_intern_hit();
        metrics.record_lookup_call();

        let snap = metrics.snapshot(1);
        assert_eq!(snap.intern_calls, 3);
        assert_eq!(snap.intern_hits, 2);
        assert_eq!(snap.intern_misses, 1);
        assert_eq!(snap.lookup_calls, 1);
        assert_eq!(snap.lookup_hits, 0);
        assert_eq!(snap.distinct_values, 1);

        metrics.reset();
        assert_eq!(metrics.snapshot(1).intern_calls, 0);
    }

    #[test]
    fn factory_counters() {
        let metrics = FactoryMetrics::default();
        metrics.record_context_created();
        metrics.record_context_created();
        metrics.record_context_rejected();
        metrics.record_context_removed();

        let snap = metrics.snapshot(1, 1);
        assert_eq!(snap.contexts_created, 2);
        assert_eq!(snap.contexts_rejected, 1);
        assert_eq!(snap.contexts_removed, 1);
        assert_eq!(snap.live_contexts, 1);
    }
}
