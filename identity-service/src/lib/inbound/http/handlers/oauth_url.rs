use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AuthError;
use crate::domain::account::models::Provider;
use crate::domain::account::ports::AccountRepository;
use crate::inbound::http::router::AppState;

/// Build the provider redirect URL that starts a federated login.
pub async fn oauth_url<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthUrlQuery>,
) -> Result<ApiSuccess<OAuthUrlResponseData>, ApiError> {
    let provider = provider
        .parse::<Provider>()
        .map_err(|e| ApiError::from(AuthError::from(e)))?;

    let authorization_url = state
        .oauth_broker
        .authorization_url(provider, query.state.as_deref())
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        OAuthUrlResponseData {
            provider: provider.to_string(),
            authorization_url,
        },
    ))
}

/// Optional CSRF state the client validates unchanged on the callback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthUrlQuery {
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthUrlResponseData {
    pub provider: String,
    pub authorization_url: String,
}
