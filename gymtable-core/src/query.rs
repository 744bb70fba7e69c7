//! Caller-supplied schedule filters.

use chrono::{DateTime, Duration, Utc};

use crate::error::{GymTableError, GymTableResult};
use crate::occurrence::ClassOccurrence;
use crate::registry::Gym;

/// Maximum result count when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 1000;

/// An ephemeral filter over class occurrences. Never persisted.
#[derive(Debug, Clone)]
pub struct GymQuery {
    /// Exact gym to match, or all gyms when unset.
    pub gym: Option<Gym>,
    /// Case-insensitive substring matched against the normalized and the
    /// raw class name.
    pub name: Option<String>,
    /// Window over start times: only `after < start < before` matches.
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
    pub limit: u32,
}

impl Default for GymQuery {
    /// The upcoming year, any gym, any class.
    fn default() -> Self {
        let now = Utc::now();
        GymQuery {
            gym: None,
            name: None,
            after: now,
            before: now + Duration::days(365),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl GymQuery {
    /// Reject filters no query path could serve.
    pub fn validate(&self) -> GymTableResult<()> {
        if self.before <= self.after {
            return Err(GymTableError::InvalidQuery(
                "'before' must be after 'after'".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(GymTableError::InvalidQuery(
                "limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// In-memory counterpart of the store's SQL filter.
    ///
    /// The stale path runs freshly ingested occurrences through this, so
    /// both paths return the same result for the same underlying data.
    pub fn matches(&self, occurrence: &ClassOccurrence) -> bool {
        if self.gym.is_some_and(|gym| gym != occurrence.gym) {
            return false;
        }
        if let Some(name) = &self.name {
            let needle = name.to_uppercase();
            if !occurrence.name.to_uppercase().contains(&needle)
                && !occurrence.raw_name.to_uppercase().contains(&needle)
            {
                return false;
            }
        }
        self.after < occurrence.start && occurrence.start < self.before
    }
}
