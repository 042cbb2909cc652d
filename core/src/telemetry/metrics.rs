use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Counters since the session started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub rebuilds: usize,
    pub load_failures: usize,
    pub stale_responses: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_rebuild(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rebuilds += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.load_failures += 1;
        }
    }

    pub fn record_stale(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stale_responses += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_rebuild();
        metrics.record_rebuild();
        metrics.record_stale();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                rebuilds: 2,
                load_failures: 0,
                stale_responses: 1,
            }
        );
    }
}
