use crate::core::error::AnnounceError;
use crate::stores::peer_store::StoreStats;
use crate::utils::time::current_timestamp;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub total_announces: AtomicU64,
    pub successful_announces: AtomicU64,
    pub validation_failures: AtomicU64,
    pub codec_failures: AtomicU64,
    pub storage_failures: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub total_announces: u64,
    pub successful_announces: u64,
    pub failed_announces: u64,
    pub validation_failures: u64,
    pub codec_failures: u64,
    pub storage_failures: u64,
    pub success_rate: f64,
    pub active_peers: usize,
    pub active_torrents: usize,
    pub uptime_seconds: i64,
    pub requests_per_second: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_announces: AtomicU64::new(0),
            successful_announces: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            codec_failures: AtomicU64::new(0),
            storage_failures: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_announces(&self) {
        self.total_announces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_successful(&self) {
        self.successful_announces.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed announce under the kind of error that ended it.
    pub fn record_failure(&self, error: &AnnounceError) {
        let counter = match error {
            AnnounceError::Validation(_) | AnnounceError::UnknownEndpoint => &self.validation_failures,
            AnnounceError::Codec(_) => &self.codec_failures,
            AnnounceError::Storage(_) => &self.storage_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self, store: StoreStats) -> MetricsSnapshot {
        let total_announces = self.total_announces.load(Ordering::Relaxed);
        let successful_announces = self.successful_announces.load(Ordering::Relaxed);
        let validation_failures = self.validation_failures.load(Ordering::Relaxed);
        let codec_failures = self.codec_failures.load(Ordering::Relaxed);
        let storage_failures = self.storage_failures.load(Ordering::Relaxed);

        let success_rate = if total_announces > 0 {
            (successful_announces as f64 / total_announces as f64) * 100.0
        } else {
            0.0
        };

        let uptime_seconds = current_timestamp() - self.start_time;

        let requests_per_second = if uptime_seconds > 0 {
            total_announces as f64 / uptime_seconds as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            total_announces,
            successful_announces,
            failed_announces: validation_failures + codec_failures + storage_failures,
            validation_failures,
            codec_failures,
            storage_failures,
            success_rate,
            active_peers: store.peers,
            active_torrents: store.torrents,
            uptime_seconds,
            requests_per_second,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CodecError, StoreError, ValidationError};

    #[test]
    fn test_new_metrics() {
        let metrics = Metrics::new();

        assert_eq!(metrics.total_announces.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.successful_announces.load(Ordering::Relaxed), 0);
        assert!(metrics.start_time > 0);
    }

    #[test]
    fn test_record_failure_by_kind() {
        let metrics = Metrics::new();

        metrics.record_failure(&ValidationError::MissingParameter("info_hash").into());
        metrics.record_failure(&ValidationError::InvalidPort("x".to_string()).into());
        metrics.record_failure(&CodecError::InvalidAddressLength(3).into());
        metrics.record_failure(&StoreError::Unavailable("down".to_string()).into());

        assert_eq!(metrics.validation_failures.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.codec_failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.storage_failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_get_snapshot_empty() {
        let snapshot = Metrics::new().get_snapshot(StoreStats::default());

        assert_eq!(snapshot.total_announces, 0);
        assert_eq!(snapshot.failed_announces, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.active_peers, 0);
        assert!(snapshot.uptime_seconds >= 0);
        assert_eq!(snapshot.requests_per_second, 0.0);
    }

    #[test]
    fn test_success_rate_calculation() {
        let metrics = Metrics::new();

        // 8 successful out of 10 total = 80%
        for _ in 0..10 {
            metrics.increment_announces();
        }
        for _ in 0..8 {
            metrics.increment_successful();
        }
        for _ in 0..2 {
            metrics.record_failure(&CodecError::InvalidAddressLength(1).into());
        }

        let snapshot = metrics.get_snapshot(StoreStats { peers: 7, torrents: 2 });

        assert_eq!(snapshot.success_rate, 80.0);
        assert_eq!(snapshot.failed_announces, 2);
        assert_eq!(snapshot.active_peers, 7);
        assert_eq!(snapshot.active_torrents, 2);
    }
}
