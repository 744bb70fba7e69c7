//! Cache staleness policy.
//!
//! Feeds publish a rolling window of upcoming sessions. If the furthest-out
//! stored session is not comfortably in the future, the store no longer
//! reflects the feed's current window and must be refreshed before queries
//! near the window's edge can be trusted.
//!
//! All instants are UTC; venue-local time only exists at feed-parse time.

use chrono::{DateTime, Duration, Utc};

/// Default number of days the store's newest occurrence must reach into the
/// future for the cache to answer queries without a refresh.
pub const STALENESS_HORIZON_DAYS: i64 = 6;

/// Fresh iff the newest stored start time is at least `horizon` in the
/// future. An empty store is always stale.
pub fn is_fresh(latest: Option<DateTime<Utc>>, now: DateTime<Utc>, horizon: Duration) -> bool {
    latest.is_some_and(|latest| latest >= now + horizon)
}
