pub mod classes;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use gymtable_core::GymTableError;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert core errors to HTTP responses: caller errors are 400, everything
/// else surfaces as 500.
pub struct AppError(GymTableError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GymTableError::InvalidQuery(_) | GymTableError::UnknownGym(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<GymTableError> for AppError {
    fn from(err: GymTableError) -> Self {
        Self(err)
    }
}
