//! Reception endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::{decode, lenient_pvz_id};
use crate::auth::CurrentUser;
use crate::dto::ReceptionDto;
use crate::error::{ApiError, RespondWith};
use crate::state::AppState;

const OPEN_RECEPTION_EXISTS: &str = "Неверный запрос или есть незакрытая приемка";
const RECEPTION_ALREADY_CLOSED: &str = "Неверный запрос или приемка уже закрыта";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceptionRequest {
    pub pvz_id: String,
}

/// POST /receptions: Open a reception at a pickup point.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<CreateReceptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReceptionDto>), ApiError> {
    let request = decode(payload)?;
    let reception = state
        .receptions
        .create(user.user(), lenient_pvz_id(&request.pvz_id))
        .await
        .respond_with(OPEN_RECEPTION_EXISTS)?;

    Ok((StatusCode::CREATED, Json(reception.into())))
}

/// POST /pvz/{pvz_id}/close_last_reception
#[tracing::instrument(skip(state))]
pub async fn close_last(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(pvz_id): Path<String>,
) -> Result<Json<ReceptionDto>, ApiError> {
    let reception = state
        .receptions
        .close(user.user(), lenient_pvz_id(&pvz_id))
        .await
        .respond_with(RECEPTION_ALREADY_CLOSED)?;

    Ok(Json(reception.into()))
}
