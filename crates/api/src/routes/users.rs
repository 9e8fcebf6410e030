//! Account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use common::UserRole;
use domain::{DomainError, ErrorKind};
use serde::Deserialize;

use super::decode;
use crate::dto::UserDto;
use crate::error::{ApiError, INVALID_REQUEST, RespondWith};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DummyLoginRequest {
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /dummyLogin: Token for a throw-away user with the given role.
#[tracing::instrument(skip(state, payload))]
pub async fn dummy_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DummyLoginRequest>, JsonRejection>,
) -> Result<Json<String>, ApiError> {
    let request = decode(payload)?;
    let token = state
        .users
        .dummy_login(request.role)
        .await
        .respond_with(INVALID_REQUEST)?;

    Ok(Json(token))
}

/// POST /register
#[tracing::instrument(skip(state, payload))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let request = decode(payload)?;
    let user = state
        .users
        .register(&request.email, &request.password, request.role)
        .await
        .respond_with(INVALID_REQUEST)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /login
#[tracing::instrument(skip(state, payload))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<String>, ApiError> {
    let request = decode(payload)?;
    let token = state
        .users
        .login(&request.email, &request.password)
        .await
        .map_err(login_failed)?;

    Ok(Json(token))
}

/// Wrong credentials answer 401; anything else is an ordinary failure.
fn login_failed(source: DomainError) -> ApiError {
    match source.kind() {
        ErrorKind::Credentials => ApiError::Unauthorized(source),
        _ => ApiError::Domain {
            source,
            message: INVALID_REQUEST,
        },
    }
}
