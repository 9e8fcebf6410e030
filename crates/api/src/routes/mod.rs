pub mod health;
pub mod products;
pub mod pvz;
pub mod receptions;
pub mod users;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use common::PvzId;

use crate::error::ApiError;

/// Unwraps a JSON body, turning decode failures into a 400.
fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Malformed ids become the nil id, which the services reject after their
/// role check.
fn lenient_pvz_id(raw: &str) -> PvzId {
    PvzId::parse_str(raw).unwrap_or_else(|_| PvzId::nil())
}
