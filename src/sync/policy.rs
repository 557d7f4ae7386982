//! Cache validity

use chrono::{DateTime, Duration, Utc};

/// One hour
pub fn default_ttl() -> Duration {
    Duration::hours(1)
}

/// True iff more than `ttl` has elapsed since `fetched_at`.
///
/// A missing timestamp is always stale. Exactly `ttl` old is still fresh.
pub fn is_stale(fetched_at: Option<DateTime<Utc>>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match fetched_at {
        Some(at) => now - at > ttl,
        None => true,
    }
}
