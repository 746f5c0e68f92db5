use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AuthError;
use crate::domain::account::ports::AccountRepository;
use crate::inbound::http::router::AppState;

/// Trade a refresh token for a new access token.
///
/// The refresh token is not rotated; clients keep presenting the one they
/// were issued until it expires.
pub async fn refresh<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    Json(body): Json<RefreshRequestBody>,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let access_token = state
        .token_service
        .refresh(&body.refresh_token)
        .map_err(|e| ApiError::from(AuthError::Token(e)))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RefreshResponseData {
            access_token,
            token_type: "bearer",
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequestBody {
    refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
    pub token_type: &'static str,
}
