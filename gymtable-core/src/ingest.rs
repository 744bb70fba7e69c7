//! Concurrent feed ingestion.
//!
//! Fetch-and-parse runs as a bounded fan-out, one task per registered gym,
//! joined before any result is used. A failing feed loses only its own
//! contribution; only a round where every feed fails is an error.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{GymTableError, GymTableResult};
use crate::feed::{FeedEvent, FeedFetcher, parse_feed};
use crate::normalize::normalize;
use crate::occurrence::ClassOccurrence;
use crate::query::GymQuery;
use crate::registry::{FeedRegistry, FeedSource};
use crate::store::ScheduleStore;

/// Fetches feeds, persists the parsed occurrences, and returns the subset
/// matching the caller's filter.
pub struct IngestionPipeline {
    registry: Arc<FeedRegistry>,
    store: ScheduleStore,
    fetcher: Arc<dyn FeedFetcher>,
}

impl IngestionPipeline {
    pub fn new(
        registry: Arc<FeedRegistry>,
        store: ScheduleStore,
        fetcher: Arc<dyn FeedFetcher>,
    ) -> Self {
        IngestionPipeline {
            registry,
            store,
            fetcher,
        }
    }

    /// Fetch, parse, persist and filter.
    ///
    /// Returns the freshly parsed occurrences matching `query`, ascending by
    /// start time; the store refresh happens as a side effect. Blocks until
    /// every dispatched fetch has completed or failed.
    pub async fn ingest(&self, query: &GymQuery) -> GymTableResult<Vec<ClassOccurrence>> {
        let sources: Vec<&FeedSource> = match query.gym {
            Some(gym) => vec![self.registry.source(gym)?],
            None => self.registry.sources().iter().collect(),
        };

        let fetches = sources.into_iter().map(|source| async move {
            match self.fetch_feed(source).await {
                Ok(events) => {
                    debug!(gym = %source.gym, events = events.len(), "parsed feed");
                    Some((source, events))
                }
                Err(error) => {
                    warn!(gym = %source.gym, %error, "feed failed, continuing without it");
                    None
                }
            }
        });

        let feeds: Vec<(&FeedSource, Vec<FeedEvent>)> =
            join_all(fetches).await.into_iter().flatten().collect();
        if feeds.is_empty() {
            return Err(GymTableError::AllFeedsFailed);
        }

        let mut matched = Vec::new();
        for (source, events) in feeds {
            for event in events {
                let occurrence = to_occurrence(source, event);
                if let Err(error) = self.store.insert_if_absent(&occurrence).await {
                    warn!(
                        gym = %occurrence.gym,
                        class = %occurrence.name,
                        %error,
                        "failed to persist occurrence, skipping"
                    );
                }
                if query.matches(&occurrence) {
                    matched.push(occurrence);
                }
            }
        }

        matched.sort_by_key(|occurrence| occurrence.start);
        matched.truncate(query.limit as usize);
        Ok(matched)
    }

    async fn fetch_feed(&self, source: &FeedSource) -> GymTableResult<Vec<FeedEvent>> {
        let content = self.fetcher.fetch(&source.url).await?;
        parse_feed(&content)
    }
}

/// The feed's originating source identifies the gym; its timezone resolves
/// floating timestamps and its coordinates decorate the result.
fn to_occurrence(source: &FeedSource, event: FeedEvent) -> ClassOccurrence {
    ClassOccurrence {
        gym: source.gym,
        name: normalize(&event.summary).to_string(),
        raw_name: event.summary,
        location: event.location,
        start: event.start.to_utc(source.timezone),
        end: event.end.to_utc(source.timezone),
        latlong: Some(source.latlong.clone()),
    }
}
