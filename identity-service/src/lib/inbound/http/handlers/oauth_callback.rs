use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use crate::account::errors::AuthError;
use crate::domain::account::models::Provider;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::IdentityResolver;
use crate::inbound::http::router::AppState;

/// Complete a federated login from the provider's callback code.
///
/// Exchanges the code upstream, fetches the provider identity, and signs
/// in the matching account, creating it on first login.
pub async fn oauth_callback<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    Path(provider): Path<String>,
    Json(body): Json<OAuthCallbackRequestBody>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let provider = provider
        .parse::<Provider>()
        .map_err(|e| ApiError::from(AuthError::from(e)))?;

    let provider_token = state
        .oauth_broker
        .exchange_code(provider, &body.code)
        .await
        .map_err(ApiError::from)?;

    let identity = state
        .oauth_broker
        .fetch_identity(provider, &provider_token)
        .await
        .map_err(ApiError::from)?;

    let account = state
        .identity_service
        .resolve_oauth_identity(provider, identity)
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
pub struct OAuthCallbackRequestBody {
    code: String,
}
