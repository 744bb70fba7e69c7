//! End-to-end coverage of the stale and fresh query paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};

use gymtable_core::error::{GymTableError, GymTableResult};
use gymtable_core::feed::FeedFetcher;
use gymtable_core::store::ScheduleStore;
use gymtable_core::{ClassOccurrence, Gym, GymQuery, Timetable, TimetableConfig};

/// Serves canned feed documents by URL; unknown URLs fail like an
/// unreachable feed.
struct CannedFetcher {
    feeds: HashMap<String, String>,
    calls: AtomicUsize,
}

impl CannedFetcher {
    fn new(feeds: HashMap<String, String>) -> Arc<Self> {
        Arc::new(CannedFetcher {
            feeds,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedFetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> GymTableResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| GymTableError::FeedFetch(format!("unreachable feed: {url}")))
    }
}

fn feed_url(config: &TimetableConfig, gym: Gym) -> String {
    let source = config.gyms.iter().find(|entry| entry.gym == gym).unwrap();
    format!("{}{}", config.feed_base_url, source.feed_id)
}

fn ics_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// A VCALENDAR with one 45-minute event per (start, summary, location).
fn feed_document(events: &[(DateTime<Utc>, &str, &str)]) -> String {
    let mut body = String::from("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:GYMTABLE-TEST\n");
    for (index, (start, summary, location)) in events.iter().enumerate() {
        body.push_str(&format!(
            "BEGIN:VEVENT\nUID:event-{index}\nSUMMARY:{summary}\nLOCATION:{location}\n\
             DTSTART:{}\nDTEND:{}\nEND:VEVENT\n",
            ics_utc(*start),
            ics_utc(*start + Duration::minutes(45)),
        ));
    }
    body.push_str("END:VCALENDAR\n");
    body
}

fn now_to_the_second() -> DateTime<Utc> {
    Utc::now().with_nanosecond(0).unwrap()
}

fn seeded_occurrence(start: DateTime<Utc>) -> ClassOccurrence {
    ClassOccurrence {
        gym: Gym::City,
        name: "BODYPUMP".to_string(),
        raw_name: "BODYPUMP 45".to_string(),
        location: "Studio 1".to_string(),
        start,
        end: start + Duration::minutes(45),
        latlong: None,
    }
}

#[tokio::test]
async fn stale_store_ingests_then_fresh_store_agrees() {
    let config = TimetableConfig::default();
    let now = now_to_the_second();

    // the far-out event pushes the store past the staleness horizon
    let feed = feed_document(&[
        (now + Duration::hours(10), "RPM 30", "Cycle Studio"),
        (now + Duration::hours(1), "BODYPUMP 45 with Jane", "Studio 1"),
        (now + Duration::days(30), "YOGA", "Studio 2"),
    ]);
    let fetcher = CannedFetcher::new(HashMap::from([(feed_url(&config, Gym::City), feed)]));

    let store = ScheduleStore::in_memory().await.unwrap();
    let timetable =
        Timetable::with_fetcher(&config, store.clone(), fetcher.clone()).unwrap();

    let query = GymQuery {
        gym: Some(Gym::City),
        ..GymQuery::default()
    };

    // empty store: stale path fetches, persists and answers
    let first = timetable.classes(&query).await.unwrap();
    assert_eq!(first.len(), 3);
    assert!(first.windows(2).all(|pair| pair[0].start <= pair[1].start));
    assert_eq!(first[0].name, "BODYPUMP");
    assert_eq!(first[0].raw_name, "BODYPUMP 45 with Jane");
    assert_eq!(first[0].latlong.as_deref(), Some("-36.8483137,174.6877862"));
    assert_eq!(fetcher.calls(), 1);

    let persisted = store.query(&query).await.unwrap();
    assert_eq!(persisted.len(), 3);

    // second call: the store now reaches past the horizon, so the fresh
    // path answers from it without fetching, and observably agrees
    let second = timetable.classes(&query).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn reingesting_identical_feed_content_is_idempotent() {
    let config = TimetableConfig::default();
    let now = now_to_the_second();

    let feed = feed_document(&[
        (now + Duration::hours(1), "BODYPUMP 45", "Studio 1"),
        (now + Duration::hours(10), "RPM 30", "Cycle Studio"),
    ]);
    let fetcher = CannedFetcher::new(HashMap::from([(feed_url(&config, Gym::City), feed)]));

    let store = ScheduleStore::in_memory().await.unwrap();
    let timetable =
        Timetable::with_fetcher(&config, store.clone(), fetcher.clone()).unwrap();

    let query = GymQuery {
        gym: Some(Gym::City),
        ..GymQuery::default()
    };

    // both events are near now, so the store stays stale and every call
    // re-ingests the same content
    let first = timetable.classes(&query).await.unwrap();
    let second = timetable.classes(&query).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second, first);
    assert_eq!(fetcher.calls(), 2);

    let persisted = store.query(&query).await.unwrap();
    assert_eq!(persisted.len(), 2, "re-ingestion must not duplicate rows");
}

#[tokio::test]
async fn one_failing_feed_does_not_fail_ingestion() {
    let config = TimetableConfig::default();
    let now = now_to_the_second();

    let fetcher = CannedFetcher::new(HashMap::from([
        (
            feed_url(&config, Gym::City),
            feed_document(&[(now + Duration::hours(1), "BODYPUMP 45", "Studio 1")]),
        ),
        (
            feed_url(&config, Gym::Britomart),
            feed_document(&[(now + Duration::hours(2), "CXWORX", "Studio 3")]),
        ),
        // takapuna and newmarket feeds stay unreachable
    ]));

    let store = ScheduleStore::in_memory().await.unwrap();
    let timetable = Timetable::with_fetcher(&config, store, fetcher.clone()).unwrap();

    let classes = timetable.classes(&GymQuery::default()).await.unwrap();
    assert_eq!(classes.len(), 2);
    let gyms: Vec<Gym> = classes.iter().map(|occurrence| occurrence.gym).collect();
    assert!(gyms.contains(&Gym::City));
    assert!(gyms.contains(&Gym::Britomart));

    // every registered feed was attempted
    assert_eq!(fetcher.calls(), 4);
}

#[tokio::test]
async fn every_feed_failing_is_an_error_not_an_empty_success() {
    let config = TimetableConfig::default();
    let fetcher = CannedFetcher::new(HashMap::new());

    let store = ScheduleStore::in_memory().await.unwrap();
    let timetable = Timetable::with_fetcher(&config, store, fetcher).unwrap();

    assert!(matches!(
        timetable.classes(&GymQuery::default()).await,
        Err(GymTableError::AllFeedsFailed)
    ));
}

#[tokio::test]
async fn fresh_store_answers_without_touching_the_feeds() {
    let config = TimetableConfig::default();
    let now = now_to_the_second();

    let store = ScheduleStore::in_memory().await.unwrap();
    let seeded = seeded_occurrence(now + Duration::days(10));
    assert!(store.insert_if_absent(&seeded).await.unwrap());

    // a fetcher with no feeds: any fetch would turn into AllFeedsFailed
    let fetcher = CannedFetcher::new(HashMap::new());
    let timetable =
        Timetable::with_fetcher(&config, store, fetcher.clone()).unwrap();

    let classes = timetable.classes(&GymQuery::default()).await.unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "BODYPUMP");
    // coordinates are decorated from the registry on the fresh path too
    assert_eq!(
        classes[0].latlong.as_deref(),
        Some("-36.8483137,174.6877862")
    );
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn invalid_filters_are_rejected_before_any_work() {
    let config = TimetableConfig::default();
    let store = ScheduleStore::in_memory().await.unwrap();
    let fetcher = CannedFetcher::new(HashMap::new());
    let timetable = Timetable::with_fetcher(&config, store, fetcher.clone()).unwrap();

    let now = Utc::now();
    let inverted = GymQuery {
        after: now,
        before: now - Duration::days(1),
        ..GymQuery::default()
    };
    assert!(matches!(
        timetable.classes(&inverted).await,
        Err(GymTableError::InvalidQuery(_))
    ));

    let zero_limit = GymQuery {
        limit: 0,
        ..GymQuery::default()
    };
    assert!(matches!(
        timetable.classes(&zero_limit).await,
        Err(GymTableError::InvalidQuery(_))
    ));

    assert_eq!(fetcher.calls(), 0);
}
