use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_profile::get_profile;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::oauth_callback::oauth_callback;
use super::handlers::oauth_url::oauth_url;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::update_profile::update_profile;
use super::middleware::authenticate;
use super::middleware::require_active;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::service::IdentityService;
use crate::outbound::oauth::OAuthBroker;

/// Shared application state for HTTP handlers.
///
/// Generic over the repository so integration tests can run against the
/// in-memory store.
pub struct AppState<AR: AccountRepository> {
    pub identity_service: Arc<IdentityService<AR>>,
    pub token_service: Arc<TokenService>,
    pub oauth_broker: Arc<OAuthBroker>,
}

impl<AR: AccountRepository> Clone for AppState<AR> {
    fn clone(&self) -> Self {
        Self {
            identity_service: Arc::clone(&self.identity_service),
            token_service: Arc::clone(&self.token_service),
            oauth_broker: Arc::clone(&self.oauth_broker),
        }
    }
}

pub fn create_router<AR: AccountRepository>(
    identity_service: Arc<IdentityService<AR>>,
    token_service: Arc<TokenService>,
    oauth_broker: Arc<OAuthBroker>,
) -> Router {
    let state = AppState {
        identity_service,
        token_service,
        oauth_broker,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<AR>))
        .route("/api/auth/login", post(login::<AR>))
        .route("/api/auth/refresh", post(refresh::<AR>))
        .route("/api/auth/oauth/:provider/url", get(oauth_url::<AR>))
        .route(
            "/api/auth/oauth/:provider/callback",
            post(oauth_callback::<AR>),
        );

    let profile_routes = Router::new()
        .route("/api/auth/profile", get(get_profile))
        .route("/api/auth/profile", put(update_profile::<AR>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_active::<AR>,
        ));

    // Logout only acknowledges, so an inactive account may still call it.
    let session_routes = Router::new()
        .route("/api/auth/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<AR>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(profile_routes)
        .merge(session_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
