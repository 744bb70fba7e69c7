//! Feed source registry: gym identifier → feed URL, coordinates, timezone.
//!
//! The registry is immutable process-wide configuration, constructed once at
//! startup and passed by shared ownership into the components that need it.

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::TimetableConfig;
use crate::error::{GymTableError, GymTableResult};

/// The registered gym locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gym {
    City,
    Britomart,
    Takapuna,
    Newmarket,
}

impl Gym {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gym::City => "city",
            Gym::Britomart => "britomart",
            Gym::Takapuna => "takapuna",
            Gym::Newmarket => "newmarket",
        }
    }
}

impl fmt::Display for Gym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gym {
    type Err = GymTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "city" => Ok(Gym::City),
            "britomart" => Ok(Gym::Britomart),
            "takapuna" => Ok(Gym::Takapuna),
            "newmarket" => Ok(Gym::Newmarket),
            other => Err(GymTableError::UnknownGym(other.to_string())),
        }
    }
}

/// One gym's feed location and physical coordinates.
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub gym: Gym,
    /// Full feed URL (base URL + per-gym feed id).
    pub url: String,
    /// "lat,long" string attached to query results.
    pub latlong: String,
    /// Civil timezone used to resolve timezone-naive feed timestamps.
    pub timezone: Tz,
}

/// Immutable gym → feed source lookup.
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    sources: Vec<FeedSource>,
}

impl FeedRegistry {
    pub fn from_config(config: &TimetableConfig) -> GymTableResult<Self> {
        let sources = config
            .gyms
            .iter()
            .map(|entry| {
                let timezone = entry.timezone.parse::<Tz>().map_err(|_| {
                    GymTableError::Config(format!(
                        "unknown timezone '{}' for gym '{}'",
                        entry.timezone, entry.gym
                    ))
                })?;
                Ok(FeedSource {
                    gym: entry.gym,
                    url: format!("{}{}", config.feed_base_url, entry.feed_id),
                    latlong: entry.latlong.clone(),
                    timezone,
                })
            })
            .collect::<GymTableResult<Vec<_>>>()?;

        if sources.is_empty() {
            return Err(GymTableError::Config(
                "no gym feed sources configured".to_string(),
            ));
        }

        Ok(FeedRegistry { sources })
    }

    /// All registered feed sources, in configuration order.
    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    /// The feed source for one gym; an error if the gym is not configured.
    pub fn source(&self, gym: Gym) -> GymTableResult<&FeedSource> {
        self.sources
            .iter()
            .find(|source| source.gym == gym)
            .ok_or_else(|| GymTableError::UnknownGym(gym.to_string()))
    }

    pub fn latlong(&self, gym: Gym) -> Option<&str> {
        self.sources
            .iter()
            .find(|source| source.gym == gym)
            .map(|source| source.latlong.as_str())
    }
}
