//! Calendar feed retrieval and parsing.

mod fetch;
mod parse;

pub use fetch::{DEFAULT_FETCH_TIMEOUT, FeedFetcher, HttpFeedFetcher};
pub use parse::{FeedEvent, FeedTime, parse_feed};
