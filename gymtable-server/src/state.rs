use std::sync::Arc;

use gymtable_core::Timetable;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub timetable: Arc<Timetable>,
}
