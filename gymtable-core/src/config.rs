//! Static service configuration.
//!
//! Everything here is read once at startup: the feed base URL, the per-gym
//! feed ids and coordinates, the staleness horizon and the database path.
//! There is no runtime reconfiguration.

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use crate::error::{GymTableError, GymTableResult};
use crate::registry::Gym;
use crate::staleness::STALENESS_HORIZON_DAYS;

fn default_database_path() -> PathBuf {
    PathBuf::from("gym.db")
}

fn default_feed_base_url() -> String {
    "https://www.lesmills.co.nz/timetable-calander.ashx?club=".to_string()
}

fn default_staleness_horizon_days() -> i64 {
    STALENESS_HORIZON_DAYS
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_port() -> u16 {
    9000
}

fn default_refresh_interval_hours() -> u64 {
    24
}

fn default_timezone() -> String {
    "Pacific/Auckland".to_string()
}

/// Service configuration, loaded from an optional TOML file.
///
/// Every field has a default, so a missing file yields a fully working
/// configuration for the registered gyms.
#[derive(Debug, Clone, Deserialize)]
pub struct TimetableConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_feed_base_url")]
    pub feed_base_url: String,

    /// The cache is stale unless it already holds an occurrence at least
    /// this many days in the future.
    #[serde(default = "default_staleness_horizon_days")]
    pub staleness_horizon_days: i64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: u64,

    #[serde(default = "default_gym_sources")]
    pub gyms: Vec<GymSourceConfig>,
}

/// One gym's feed id, physical coordinates and civil timezone.
#[derive(Debug, Clone, Deserialize)]
pub struct GymSourceConfig {
    pub gym: Gym,
    pub feed_id: String,
    pub latlong: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn gym_source(gym: Gym, feed_id: &str, latlong: &str) -> GymSourceConfig {
    GymSourceConfig {
        gym,
        feed_id: feed_id.to_string(),
        latlong: latlong.to_string(),
        timezone: default_timezone(),
    }
}

fn default_gym_sources() -> Vec<GymSourceConfig> {
    vec![
        gym_source(
            Gym::City,
            "96382586-e31c-df11-9eaa-0050568522bb",
            "-36.8483137,174.6877862",
        ),
        gym_source(
            Gym::Britomart,
            "744366a6-c70b-e011-87c7-0050568522bb",
            "-36.845961,174.759604",
        ),
        gym_source(
            Gym::Takapuna,
            "98382586-e31c-df11-9eaa-0050568522bb",
            "-36.787821,174.7679373",
        ),
        gym_source(
            Gym::Newmarket,
            "b6aa431c-ce1a-e511-a02f-0050568522bb",
            "-36.8662563,174.7685271",
        ),
    ]
}

impl Default for TimetableConfig {
    fn default() -> Self {
        TimetableConfig {
            database_path: default_database_path(),
            feed_base_url: default_feed_base_url(),
            staleness_horizon_days: default_staleness_horizon_days(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            port: default_port(),
            refresh_interval_hours: default_refresh_interval_hours(),
            gyms: default_gym_sources(),
        }
    }
}

impl TimetableConfig {
    /// Load configuration from `path`, falling back to defaults for anything
    /// the file does not set. A missing file yields the defaults.
    pub fn load(path: &Path) -> GymTableResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| GymTableError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GymTableError::Config(e.to_string()))
    }
}
