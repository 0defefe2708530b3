//! Workload statistics tracking

use std::time::{Duration, Instant};

/// Statistics tracked by each workload loop
#[derive(Debug, Default, Clone)]
pub struct WorkloadStats {
    /// Number of successfully completed queries
    pub completed: usize,

    /// Number of failed queries
    pub errors: usize,

    /// Cumulative latency of completed queries
    pub total_latency: Duration,

    /// Slowest completed query
    pub max_latency: Option<Duration>,

    /// Loop start time
    pub started_at: Option<Instant>,

    /// Loop end time
    pub ended_at: Option<Instant>,
}

impl WorkloadStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Get total number of queries (completed + errors)
    pub fn total_queries(&self) -> usize {
        self.completed + self.errors
    }

    /// Record a successfully completed query
    pub fn record_query(&mut self, latency: Duration) {
        self.completed += 1;
        self.total_latency += latency;
        self.max_latency = Some(self.max_latency.map_or(latency, |max| max.max(latency)));
    }

    /// Record a failed query
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Mean latency of completed queries
    pub fn mean_latency(&self) -> Option<Duration> {
        if self.completed == 0 {
            None
        } else {
            Some(self.total_latency / self.completed as u32)
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Get queries per second
    pub fn queries_per_second(&self) -> f64 {
        self.elapsed()
            .map(|d| {
                let secs = d.as_secs_f64();
                if secs > 0.0 {
                    self.total_queries() as f64 / secs
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0)
    }

    /// Merge stats from another workload
    pub fn merge(&mut self, other: &WorkloadStats) {
        self.completed += other.completed;
        self.errors += other.errors;
        self.total_latency += other.total_latency;
        self.max_latency = match (self.max_latency, other.max_latency) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_stats_defaults() {
        let stats = WorkloadStats::default();
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.total_latency, Duration::ZERO);
        assert!(stats.max_latency.is_none());
        assert!(stats.started_at.is_none());
        assert!(stats.ended_at.is_none());
    }

    #[test]
    fn test_record_query() {
        let mut stats = WorkloadStats::new();
        stats.record_query(Duration::from_millis(100));
        stats.record_query(Duration::from_millis(300));

        assert_eq!(stats.completed, 2);
        assert_eq!(stats.total_latency, Duration::from_millis(400));
        assert_eq!(stats.max_latency, Some(Duration::from_millis(300)));
        assert_eq!(stats.mean_latency(), Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_record_error() {
        let mut stats = WorkloadStats::new();
        stats.record_error();
        stats.record_error();

        assert_eq!(stats.errors, 2);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.total_queries(), 2);
        assert!(stats.mean_latency().is_none());
    }

    #[test]
    fn test_merge() {
        let mut a = WorkloadStats::new();
        a.record_query(Duration::from_millis(50));
        a.record_error();

        let mut b = WorkloadStats::new();
        b.record_query(Duration::from_millis(200));

        a.merge(&b);
        assert_eq!(a.completed, 2);
        assert_eq!(a.errors, 1);
        assert_eq!(a.total_latency, Duration::from_millis(250));
        assert_eq!(a.max_latency, Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_start_stop_elapsed() {
        let mut stats = WorkloadStats::new();
        assert!(stats.elapsed().is_none());

        stats.start();
        assert!(stats.elapsed().is_some());

        std::thread::sleep(Duration::from_millis(10));
        stats.stop();

        let elapsed = stats.elapsed().unwrap();
        assert!(elapsed >= Duration::from_millis(10));
    }
}
