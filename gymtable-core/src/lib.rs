//! Schedule ingestion-and-cache core for gymtable.
//!
//! This crate decides when cached schedule data is stale, fetches and parses
//! the per-gym calendar feeds concurrently, reconciles the results with the
//! persistent store, and answers filtered, time-ordered queries:
//! - `registry` maps gym identifiers to feed locations and coordinates
//! - `normalize` maps free-text class titles to canonical names
//! - `store` holds the deduplicated occurrences in SQLite
//! - `ingest` drives the concurrent fetch-parse-persist pipeline
//! - `timetable` ties it together behind [`Timetable::classes`]
//!
//! Outer surfaces (HTTP routing and the like) live in gymtable-server and
//! only ever call in through [`Timetable`].

pub mod config;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod normalize;
pub mod occurrence;
pub mod query;
pub mod registry;
pub mod staleness;
pub mod store;
pub mod timetable;

pub use config::TimetableConfig;
pub use error::{GymTableError, GymTableResult};
pub use occurrence::ClassOccurrence;
pub use query::GymQuery;
pub use registry::Gym;
pub use timetable::Timetable;
