use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use crate::metrics::snapshot::{FactoryMetricsSnapshot, InternMetricsSnapshot};
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for interning metrics snapshots.
///
/// Writes the Prometheus text exposition format so it can be scraped by
/// Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn writer(&self) -> MutexGuard<'_, W> {
        // A panic mid-write leaves at most a truncated line; keep exporting.
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_counter(&self, name: &str, value: u64) {
        let mut writer = self.writer();
        let _ = writeln!(writer, "# TYPE {} counter", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_gauge(&self, name: &str, value: u64) {
        let mut writer = self.writer();
        let _ = writeln!(writer, "# TYPE {} gauge", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<InternMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &InternMetricsSnapshot) {
        self.write_counter(&self.metric_name("intern_calls_total"), snapshot.intern_calls);
        self.write_counter(&self.metric_name("intern_hits_total"), snapshot.intern_hits);
        self.write_counter(
            &self.metric_name("intern_misses_total"),
            snapshot.intern_misses,
        );
        self.write_counter(&self.metric_name("lookup_calls_total"), snapshot.lookup_calls);
        self.write_counter(&self.metric_name("lookup_hits_total"), snapshot.lookup_hits);
        self.write_gauge(
            &self.metric_name("distinct_values"),
            snapshot.distinct_values as u64,
        );
    }
}

impl<W: Write + Send + Sync> MetricsExporter<FactoryMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &FactoryMetricsSnapshot) {
        self.write_counter(
            &self.metric_name("contexts_created_total"),
            snapshot.contexts_created,
        );
        self.write_counter(
            &self.metric_name("contexts_rejected_total"),
            snapshot.contexts_rejected,
        );
        self.write_counter(
            &self.metric_name("contexts_removed_total"),
            snapshot.contexts_removed,
        );
        self.write_gauge(
            &self.metric_name("live_contexts"),
            snapshot.live_contexts as u64,
        );
        self.write_gauge(
            &self.metric_name("distinct_shared"),
            snapshot.distinct_shared as u64,
        );
    }
}
