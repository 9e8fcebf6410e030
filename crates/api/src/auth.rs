//! Bearer-token extraction.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domain::AuthenticatedUser;

use crate::state::AppState;

/// The caller resolved from `Authorization: Bearer <token>`.
///
/// Absent or invalid tokens yield `None`; the services decide whether an
/// anonymous caller may proceed.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl CurrentUser {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.0.as_ref()
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(CurrentUser(None));
        };

        match state.users.authenticate(token) {
            Ok(user) => Ok(CurrentUser(Some(user))),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring invalid bearer token");
                Ok(CurrentUser(None))
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
