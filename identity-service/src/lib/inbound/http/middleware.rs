use auth::TokenError;
use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::account::errors::AuthError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::IdentityResolver;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the authenticated account for downstream handlers.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Middleware that resolves the bearer token to an account.
pub async fn authenticate<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let bearer_token = extract_bearer_token(&req);

    let account = resolve_account(&state, bearer_token).await.map_err(|e| {
        tracing::warn!("Request authentication failed: {}", e);
        ApiError::from(e).into_response()
    })?;

    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

/// Middleware that additionally rejects deactivated accounts.
pub async fn require_active<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let bearer_token = extract_bearer_token(&req);

    let account = resolve_account(&state, bearer_token)
        .await
        .and_then(|account| {
            if account.is_active {
                Ok(account)
            } else {
                Err(AuthError::InactiveAccount)
            }
        })
        .map_err(|e| {
            tracing::warn!("Request authentication failed: {}", e);
            ApiError::from(e).into_response()
        })?;

    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

// Takes the token by value: holding a borrow of the request across the
// account lookup would make the middleware futures !Send.
async fn resolve_account<AR: AccountRepository>(
    state: &AppState<AR>,
    bearer_token: Option<String>,
) -> Result<Account, AuthError> {
    let token = bearer_token.ok_or(AuthError::Unauthenticated)?;

    let claims = state.token_service.verify(&token)?;

    // Refresh tokens never authenticate requests directly.
    if claims.kind != TokenKind::Access {
        return Err(TokenError::WrongKind {
            expected: TokenKind::Access,
            actual: claims.kind,
        }
        .into());
    }

    let account_id = AccountId::from_string(&claims.sub)
        .map_err(|_| TokenError::Invalid("malformed subject claim".to_string()))?;

    // A token can outlive its account.
    let account = state
        .identity_service
        .get_by_id(&account_id)
        .await
        .map_err(|e| match e {
            AuthError::AccountNotFound(_) => AuthError::Unauthenticated,
            _ => e,
        })?;

    Ok(account)
}

/// Pull the bearer token out of the `Authorization` header as an owned value.
fn extract_bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}
