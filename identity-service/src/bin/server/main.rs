use std::sync::Arc;

use auth::TokenService;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::domain::account::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::oauth::OAuthBroker;
use identity_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    // The database URL and token secret stay out of the logs.
    tracing::info!(
        http_port = config.server.http_port,
        oauth_redirect_uri = %config.oauth.redirect_uri,
        access_ttl_minutes = config.token.access_ttl_minutes,
        refresh_ttl_days = config.token.refresh_ttl_days,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_service = Arc::new(TokenService::with_lifetimes(
        config.token.secret.as_bytes(),
        Duration::minutes(config.token.access_ttl_minutes),
        Duration::days(config.token.refresh_ttl_days),
    ));
    let oauth_broker = Arc::new(OAuthBroker::new(config.oauth.clone())?);
    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool));

    let identity_service = Arc::new(IdentityService::new(account_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(identity_service, token_service, oauth_broker);

    axum::serve(http_listener, http_application).await?;

    Ok(())
}
