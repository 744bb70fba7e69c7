//! Persistent schedule store backed by SQLite.
//!
//! A single `timetable` table holds every known class occurrence. The unique
//! index on `(gym, location, start_datetime)` makes ingestion idempotent:
//! concurrent workers can re-insert the same occurrence any number of times
//! and the store keeps exactly one row.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::error::GymTableResult;
use crate::occurrence::ClassOccurrence;
use crate::query::GymQuery;
use crate::registry::Gym;

/// Persistent, deduplicated table of class occurrences.
#[derive(Clone)]
pub struct ScheduleStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct OccurrenceRow {
    gym: String,
    class: String,
    raw_class: String,
    location: String,
    start_datetime: DateTime<Utc>,
    end_datetime: DateTime<Utc>,
}

impl TryFrom<OccurrenceRow> for ClassOccurrence {
    type Error = crate::error::GymTableError;

    fn try_from(row: OccurrenceRow) -> Result<Self, Self::Error> {
        Ok(ClassOccurrence {
            gym: row.gym.parse::<Gym>()?,
            name: row.class,
            raw_name: row.raw_class,
            location: row.location,
            start: row.start_datetime,
            end: row.end_datetime,
            latlong: None,
        })
    }
}

impl ScheduleStore {
    /// Open (creating if absent) the schedule database at `path`.
    ///
    /// Failure here is fatal: callers are expected to abort startup rather
    /// than run without a store.
    pub async fn open(path: &Path) -> GymTableResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let store = Self::connect(&url, 5).await?;
        info!("opened schedule database at {}", path.display());
        Ok(store)
    }

    /// In-memory store for tests. Pinned to a single connection: a pool
    /// would give every connection its own empty database.
    pub async fn in_memory() -> GymTableResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(url: &str, max_connections: u32) -> GymTableResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let store = ScheduleStore { pool };
        store.bootstrap().await?;
        Ok(store)
    }

    /// Idempotent schema bootstrap, run on every open.
    async fn bootstrap(&self) -> GymTableResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS timetable (
                gym TEXT NOT NULL,
                class TEXT NOT NULL,
                raw_class TEXT NOT NULL,
                location TEXT NOT NULL,
                start_datetime TEXT NOT NULL,
                end_datetime TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS unique_class \
             ON timetable (gym, location, start_datetime)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist `occurrence` unless its `(gym, location, start)` key already
    /// exists. Returns whether a new row was written.
    ///
    /// `INSERT OR IGNORE` against the unique index keeps this atomic under
    /// concurrent ingestion: colliding inserts neither error nor duplicate.
    pub async fn insert_if_absent(&self, occurrence: &ClassOccurrence) -> GymTableResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO timetable \
             (gym, class, raw_class, location, start_datetime, end_datetime) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(occurrence.gym.as_str())
        .bind(&occurrence.name)
        .bind(&occurrence.raw_name)
        .bind(&occurrence.location)
        .bind(occurrence.start)
        .bind(occurrence.end)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Occurrences matching `query`, ascending by start time, at most
    /// `query.limit` rows. The SQL here mirrors [`GymQuery::matches`].
    pub async fn query(&self, query: &GymQuery) -> GymTableResult<Vec<ClassOccurrence>> {
        let gym = query.gym.map(|gym| gym.to_string());
        let name = query.name.as_ref().map(|name| format!("%{name}%"));

        let rows: Vec<OccurrenceRow> = sqlx::query_as(
            r#"
            SELECT gym, class, raw_class, location, start_datetime, end_datetime
            FROM timetable
            WHERE (?1 IS NULL OR gym = ?1)
              AND (?2 IS NULL OR class LIKE ?2 OR raw_class LIKE ?2)
              AND start_datetime > ?3
              AND start_datetime < ?4
            ORDER BY start_datetime ASC
            LIMIT ?5
            "#,
        )
        .bind(gym)
        .bind(name)
        .bind(query.after)
        .bind(query.before)
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ClassOccurrence::try_from).collect()
    }

    /// The newest start time across all stored rows, or `None` when the
    /// store is empty. This is the staleness oracle's only input.
    pub async fn latest_start_time(&self) -> GymTableResult<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(start_datetime) FROM timetable")
                .fetch_one(&self.pool)
                .await?;
        Ok(latest)
    }
}
