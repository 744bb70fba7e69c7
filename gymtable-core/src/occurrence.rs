//! The core data model: one scheduled class session at one gym.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::Gym;

/// One scheduled class session, uniquely identified by
/// `(gym, location, start)`. Re-ingesting the same key is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOccurrence {
    pub gym: Gym,

    /// Canonical class name (see [`crate::normalize::normalize`]).
    pub name: String,

    /// The feed's free-text title, kept for substring search.
    /// Not part of the wire format.
    #[serde(skip)]
    pub raw_name: String,

    /// Room/venue string as supplied by the feed.
    pub location: String,

    #[serde(rename = "startdatetime")]
    pub start: DateTime<Utc>,

    #[serde(rename = "enddatetime")]
    pub end: DateTime<Utc>,

    /// Gym coordinates from the feed registry. Derived per gym, never
    /// stored per row.
    #[serde(rename = "latlong", skip_serializing_if = "Option::is_none", default)]
    pub latlong: Option<String>,
}
