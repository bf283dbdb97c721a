use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp() -> i64 {
    current_timestamp_millis() / 1000
}

/// Milliseconds since the Unix epoch; a clock set before 1970 reads as 0.
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Expiry timestamp for a peer that keeps announcing every `interval` seconds.
/// Records stay valid for 1.2 intervals.
pub fn expiry_after_interval(now_millis: i64, interval: u32) -> i64 {
    now_millis + i64::from(interval) * 1200
}
