mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use gymtable_core::{Timetable, TimetableConfig};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config_path = std::env::var_os("GYMTABLE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("gymtable.toml"));
    let config = TimetableConfig::load(&config_path)?;

    // An unreachable store is fatal at startup
    let timetable = Arc::new(Timetable::open(&config).await?);

    spawn_refresh_task(Arc::clone(&timetable), config.refresh_interval_hours);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::classes::router())
        .with_state(AppState { timetable })
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("gymtable-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Keep the schedule warm independently of query traffic. The first tick
/// fires immediately, so the store is populated at startup.
fn spawn_refresh_task(timetable: Arc<Timetable>, interval_hours: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_hours * 3600));
        loop {
            interval.tick().await;
            match timetable.refresh().await {
                Ok(count) => info!(count, "scheduled feed refresh complete"),
                Err(error) => error!(%error, "scheduled feed refresh failed"),
            }
        }
    });
}
