//! The query engine: the one entry point external collaborators use.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::config::TimetableConfig;
use crate::error::GymTableResult;
use crate::feed::{FeedFetcher, HttpFeedFetcher};
use crate::ingest::IngestionPipeline;
use crate::occurrence::ClassOccurrence;
use crate::query::GymQuery;
use crate::registry::FeedRegistry;
use crate::staleness::is_fresh;
use crate::store::ScheduleStore;

/// The schedule ingestion-and-cache engine.
///
/// Queries are answered from the store while its newest occurrence is
/// comfortably in the future; otherwise the feeds are re-ingested first and
/// the freshly parsed events answer the query directly.
pub struct Timetable {
    registry: Arc<FeedRegistry>,
    store: ScheduleStore,
    pipeline: IngestionPipeline,
    horizon: Duration,
}

impl Timetable {
    /// Open the schedule database and wire up the HTTP feed fetcher.
    ///
    /// A store that cannot be opened is fatal: this returns the error and
    /// callers are expected to abort startup.
    pub async fn open(config: &TimetableConfig) -> GymTableResult<Self> {
        let store = ScheduleStore::open(&config.database_path).await?;
        let fetcher = Arc::new(HttpFeedFetcher::new(StdDuration::from_secs(
            config.fetch_timeout_secs,
        ))?);
        Self::with_fetcher(config, store, fetcher)
    }

    /// Wire the engine around an existing store and fetcher. Tests inject
    /// canned fetchers here.
    pub fn with_fetcher(
        config: &TimetableConfig,
        store: ScheduleStore,
        fetcher: Arc<dyn FeedFetcher>,
    ) -> GymTableResult<Self> {
        let registry = Arc::new(FeedRegistry::from_config(config)?);
        let pipeline = IngestionPipeline::new(Arc::clone(&registry), store.clone(), fetcher);
        Ok(Timetable {
            registry,
            store,
            pipeline,
            horizon: Duration::days(config.staleness_horizon_days),
        })
    }

    /// Answer a class query, refreshing from the feeds first when the cached
    /// schedule no longer covers the staleness horizon.
    ///
    /// Results are ascending by start time, at most `query.limit` rows.
    pub async fn classes(&self, query: &GymQuery) -> GymTableResult<Vec<ClassOccurrence>> {
        query.validate()?;

        let latest = self.store.latest_start_time().await?;
        if is_fresh(latest, Utc::now(), self.horizon) {
            debug!("schedule cache is fresh, answering from the store");
            let occurrences = self.store.query(query).await?;
            Ok(occurrences
                .into_iter()
                .map(|occurrence| self.with_latlong(occurrence))
                .collect())
        } else {
            info!("schedule cache is stale, refreshing from feeds");
            self.pipeline.ingest(query).await
        }
    }

    /// Unconditionally re-ingest every registered feed, e.g. from a
    /// scheduled background refresh. Returns the number of upcoming
    /// occurrences seen.
    pub async fn refresh(&self) -> GymTableResult<usize> {
        let occurrences = self.pipeline.ingest(&GymQuery::default()).await?;
        Ok(occurrences.len())
    }

    /// Coordinates are registry-derived, never stored per row.
    fn with_latlong(&self, mut occurrence: ClassOccurrence) -> ClassOccurrence {
        occurrence.latlong = self.registry.latlong(occurrence.gym).map(str::to_string);
        occurrence
    }
}
