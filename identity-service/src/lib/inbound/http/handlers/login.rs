use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::IdentityResolver;
use crate::inbound::http::router::AppState;

/// Authenticate with email and password.
///
/// Unknown emails and wrong passwords produce the same error body, so a
/// caller cannot probe which addresses are registered.
pub async fn login<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let account = state
        .identity_service
        .authenticate_local(&body.email, &body.password)
        .await
        .map_err(ApiError::from)?;

    let tokens = state
        .token_service
        .create_session(&account.id)
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SessionData::new(&account, tokens),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}
