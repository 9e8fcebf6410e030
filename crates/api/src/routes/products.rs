//! Product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductType;
use serde::Deserialize;

use super::{decode, lenient_pvz_id};
use crate::auth::CurrentUser;
use crate::dto::ProductDto;
use crate::error::{ApiError, RespondWith};
use crate::state::AppState;

const NO_ACTIVE_RECEPTION: &str = "Неверный запрос или нет активной приемки";
const NOTHING_TO_DELETE: &str =
    "Неверный запрос, нет активной приемки или нет товаров для удаления";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub pvz_id: String,
}

/// POST /products: Add a product to the pickup point's active reception.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let request = decode(payload)?;
    let product = state
        .receptions
        .create_product(
            user.user(),
            lenient_pvz_id(&request.pvz_id),
            request.product_type,
        )
        .await
        .respond_with(NO_ACTIVE_RECEPTION)?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// POST /pvz/{pvz_id}/delete_last_product
#[tracing::instrument(skip(state))]
pub async fn delete_last(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(pvz_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .receptions
        .delete_last_product(user.user(), lenient_pvz_id(&pvz_id))
        .await
        .respond_with(NOTHING_TO_DELETE)?;

    Ok(StatusCode::OK)
}
