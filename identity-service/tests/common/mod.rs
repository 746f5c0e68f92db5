use std::sync::Arc;

use auth::TokenService;
use identity_service::config::OAuthConfig;
use identity_service::domain::account::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::oauth::OAuthBroker;
use identity_service::outbound::oauth::ProviderRegistry;
use identity_service::outbound::repositories::InMemoryAccountRepository;

/// Signing secret every test server and test-issued token shares.
pub const TOKEN_SECRET: &[u8] = b"test-secret-key-for-token-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    /// Direct handle on the account store, for mutations the API does not
    /// expose (deactivation, deletion).
    pub repository: Arc<InMemoryAccountRepository>,
    pub token_service: Arc<TokenService>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_registry(ProviderRegistry::standard()).await
    }

    /// Spawn the application with provider endpoints pointed at stubs.
    pub async fn spawn_with_registry(registry: ProviderRegistry) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryAccountRepository::new());
        let token_service = Arc::new(TokenService::new(TOKEN_SECRET));

        let oauth_config = OAuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_uri: "http://localhost:5173/auth/callback".to_string(),
        };
        let oauth_broker = Arc::new(
            OAuthBroker::with_registry(oauth_config, registry)
                .expect("Failed to create OAuth broker"),
        );

        let identity_service = Arc::new(IdentityService::new(Arc::clone(&repository)));

        let router = create_router(identity_service, Arc::clone(&token_service), oauth_broker);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            repository,
            token_service,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}
