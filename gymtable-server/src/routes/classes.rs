//! Class search endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use gymtable_core::query::DEFAULT_LIMIT;
use gymtable_core::{ClassOccurrence, Gym, GymQuery, GymTableError};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/class/", get(search_classes))
        .route("/search/", get(search_classes))
}

/// Query string for GET /class/
#[derive(Deserialize)]
pub struct ClassParams {
    gym: Option<String>,
    name: Option<String>,
    after: Option<String>,
    before: Option<String>,
    limit: Option<String>,
}

impl ClassParams {
    /// Build a core query. Missing or unparseable timestamps fall back to
    /// the default window (now .. now + 1 year); a bad gym or limit is the
    /// caller's error.
    fn into_query(self) -> Result<GymQuery, GymTableError> {
        let now = Utc::now();

        let gym = self
            .gym
            .as_deref()
            .filter(|gym| !gym.is_empty())
            .map(|gym| gym.parse::<Gym>())
            .transpose()?;

        let after = parse_instant(self.after.as_deref()).unwrap_or(now);
        let before =
            parse_instant(self.before.as_deref()).unwrap_or_else(|| now + Duration::days(365));

        let limit = match self.limit.as_deref() {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                GymTableError::InvalidQuery("limit must be a positive integer".to_string())
            })?,
        };

        let query = GymQuery {
            gym,
            name: self.name.filter(|name| !name.is_empty()),
            after,
            before,
            limit,
        };
        query.validate()?;
        Ok(query)
    }
}

fn parse_instant(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => Some(instant.with_timezone(&Utc)),
        Err(error) => {
            debug!(raw, %error, "unparseable timestamp, using default window bound");
            None
        }
    }
}

/// GET /class/ - filtered, time-ordered class occurrences
async fn search_classes(
    State(state): State<AppState>,
    Query(params): Query<ClassParams>,
) -> Result<Json<Vec<ClassOccurrence>>, AppError> {
    let query = params.into_query()?;
    let classes = state.timetable.classes(&query).await?;
    Ok(Json(classes))
}
