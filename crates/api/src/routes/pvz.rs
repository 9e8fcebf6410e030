//! Pickup point endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::City;
use serde::Deserialize;

use super::decode;
use crate::auth::CurrentUser;
use crate::dto::{PvzDto, PvzReceptionsDto};
use crate::error::{ApiError, INVALID_REQUEST, RespondWith};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePvzRequest {
    pub city: City,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /pvz: Register a pickup point (moderators only).
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<CreatePvzRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PvzDto>), ApiError> {
    let request = decode(payload)?;
    let pvz = state
        .pvzs
        .create(user.user(), request.city)
        .await
        .respond_with(INVALID_REQUEST)?;

    Ok((StatusCode::CREATED, Json(pvz.into())))
}

/// GET /pvz: Pickup points with receptions and products created in the window.
#[tracing::instrument(skip(state, params))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<PvzReceptionsDto>>, ApiError> {
    let Query(params) = params.map_err(|r| ApiError::BadRequest(r.body_text()))?;
    let listing = state
        .pvzs
        .find_pvz_reception_products(params.start_date, params.end_date, params.page, params.limit)
        .await
        .respond_with(INVALID_REQUEST)?;

    Ok(Json(listing.into_iter().map(Into::into).collect()))
}
