/// Point-in-time view of an intern table's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InternMetricsSnapshot {
    pub intern_calls: u64,
    pub intern_hits: u64,
    pub intern_misses: u64,

    pub lookup_calls: u64,
    pub lookup_hits: u64,

    // gauge captured at snapshot time
    pub distinct_values: usize,
}

impl InternMetricsSnapshot {
    /// Fraction of `intern` calls answered by an existing value.
    pub fn hit_ratio(&self) -> f64 {
        if self.intern_calls == 0 {
            0.0
        } else {
            self.intern_hits as f64 / self.intern_calls as f64
        }
    }
}

/// Point-in-time view of a context factory's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FactoryMetricsSnapshot {
    pub contexts_created: u64,
    pub contexts_rejected: u64,
    pub contexts_removed: u64,

    // gauges captured at snapshot time
    pub live_contexts: usize,
    pub distinct_shared: usize,
}

impl FactoryMetricsSnapshot {
    /// Contexts per distinct shared value; the dedup factor of the factory.
    pub fn sharing_factor(&self) -> f64 {
        if self.distinct_shared == 0 {
            0.0
        } else {
            self.contexts_created as f64 / self.distinct_shared as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_handle_empty_snapshots() {
        assert_eq!(InternMetricsSnapshot::default().hit_ratio(), 0.0);
        assert_eq!(FactoryMetricsSnapshot::default().sharing_factor(), 0.0);
    }

    #[test]
    fn ratios_from_counts() {
        let intern = InternMetricsSnapshot {
            intern_calls: 4,
            intern_hits: 3,
            intern_misses: 1,
            ..Default::default()
        };
        assert_eq!(intern.hit_ratio(), 0.75);

        let factory = FactoryMetricsSnapshot {
            contexts_created: 9,
            distinct_shared: 3,
            ..Default::default()
        };
        assert_eq!(factory.sharing_factor(), 3.0);
    }
}
