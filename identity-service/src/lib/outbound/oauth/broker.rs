use std::time::Duration;

use reqwest::header;
use reqwest::Client;
use reqwest::Response;
use reqwest::Url;
use serde::Deserialize;

use super::endpoints::ProviderEndpoints;
use super::endpoints::ProviderRegistry;
use crate::account::errors::AuthError;
use crate::config::OAuthConfig;
use crate::domain::account::models::Provider;
use crate::domain::account::models::ProviderIdentity;

/// Timeout for calls to provider endpoints.
const HTTP_TIMEOUT_SECONDS: u64 = 10;

/// OAuth2 authorization-code client for the supported providers.
///
/// Drives the three wire steps of a federated login: building the redirect
/// URL, trading the callback code for a provider access token, and fetching
/// the provider's view of the account behind that token.
pub struct OAuthBroker {
    http_client: Client,
    config: OAuthConfig,
    registry: ProviderRegistry,
}

impl OAuthBroker {
    /// Create a broker against the live provider endpoints.
    ///
    /// # Arguments
    /// * `config` - OAuth2 client registration
    pub fn new(config: OAuthConfig) -> Result<Self, anyhow::Error> {
        Self::with_registry(config, ProviderRegistry::standard())
    }

    /// Create a broker against an explicit endpoint registry.
    ///
    /// # Arguments
    /// * `config` - OAuth2 client registration
    /// * `registry` - Endpoint sets, swapped for stub servers in tests
    pub fn with_registry(
        config: OAuthConfig,
        registry: ProviderRegistry,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http_client,
            config,
            registry,
        })
    }

    /// Build the redirect URL that starts an authorization-code flow.
    ///
    /// # Arguments
    /// * `provider` - Identity provider to authorize against
    /// * `state` - Opaque CSRF value the client validates on the callback
    ///
    /// # Returns
    /// Authorization URL the client should redirect the browser to
    ///
    /// # Errors
    /// * `Unknown` - Configured endpoint and parameters do not form a valid URL
    pub fn authorization_url(
        &self,
        provider: Provider,
        state: Option<&str>,
    ) -> Result<String, AuthError> {
        let endpoints = self.registry.endpoints(provider);

        let mut params = vec![
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", endpoints.scope.as_str()),
            ("response_type", "code"),
        ];

        if let Some(state) = state {
            params.push(("state", state));
        }

        let url = Url::parse_with_params(&endpoints.authorize_url, &params)
            .map_err(|e| AuthError::Unknown(format!("Invalid authorization URL: {}", e)))?;

        Ok(url.into())
    }

    /// Trade an authorization code for the provider's access token.
    ///
    /// # Arguments
    /// * `provider` - Identity provider that issued the code
    /// * `code` - Authorization code from the callback redirect
    ///
    /// # Returns
    /// Provider access token usable against the userinfo endpoint
    ///
    /// # Errors
    /// * `UpstreamAuth` - Exchange was rejected or the provider is unreachable
    pub async fn exchange_code(&self, provider: Provider, code: &str) -> Result<String, AuthError> {
        let endpoints = self.registry.endpoints(provider);

        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(&endpoints.token_url)
            // GitHub answers with form-encoded data unless JSON is
            // requested explicitly.
            .header(header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::UpstreamAuth(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %provider,
                status = %status,
                "Token exchange rejected"
            );
            return Err(AuthError::UpstreamAuth(format!(
                "Token exchange failed: {} - {}",
                status, body
            )));
        }

        let token: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| AuthError::UpstreamAuth(format!("Invalid token response: {}", e)))?;

        Ok(token.access_token)
    }

    /// Fetch the provider's identity for the given access token.
    ///
    /// Transient connection failures are retried once; rejections are not.
    ///
    /// # Arguments
    /// * `provider` - Identity provider to query
    /// * `access_token` - Provider access token from the code exchange
    ///
    /// # Returns
    /// Normalized identity payload
    ///
    /// # Errors
    /// * `UpstreamAuth` - Provider rejected the token or sent an unreadable payload
    pub async fn fetch_identity(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<ProviderIdentity, AuthError> {
        let endpoints = self.registry.endpoints(provider);

        let response = match self.userinfo_request(endpoints, access_token).await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                tracing::warn!(provider = %provider, "Userinfo request failed, retrying");
                self.userinfo_request(endpoints, access_token)
                    .await
                    .map_err(|e| {
                        AuthError::UpstreamAuth(format!("Userinfo request failed: {}", e))
                    })?
            }
            Err(e) => {
                return Err(AuthError::UpstreamAuth(format!(
                    "Userinfo request failed: {}",
                    e
                )))
            }
        };

        if !response.status().is_success() {
            return Err(AuthError::UpstreamAuth(format!(
                "Userinfo request rejected: {}",
                response.status()
            )));
        }

        match provider {
            Provider::Google => response
                .json::<GoogleUserInfo>()
                .await
                .map(ProviderIdentity::from),
            Provider::Github => response
                .json::<GithubUserInfo>()
                .await
                .map(ProviderIdentity::from),
            Provider::Microsoft => response
                .json::<MicrosoftUserInfo>()
                .await
                .map(ProviderIdentity::from),
        }
        .map_err(|e| AuthError::UpstreamAuth(format!("Invalid userinfo payload: {}", e)))
    }

    async fn userinfo_request(
        &self,
        endpoints: &ProviderEndpoints,
        access_token: &str,
    ) -> Result<Response, reqwest::Error> {
        self.http_client
            .get(&endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
    }
}

// Token exchange response structure
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

/// Userinfo payload shape for Google.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ProviderIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        ProviderIdentity {
            subject_id: info.id,
            email: info.email,
            display_name: info.name,
            avatar_url: info.picture,
        }
    }
}

/// Userinfo payload shape for GitHub.
#[derive(Debug, Deserialize)]
struct GithubUserInfo {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl From<GithubUserInfo> for ProviderIdentity {
    fn from(info: GithubUserInfo) -> Self {
        ProviderIdentity {
            subject_id: info.id.to_string(),
            email: info.email,
            display_name: info.name.or(Some(info.login)),
            avatar_url: info.avatar_url,
        }
    }
}

/// Userinfo payload shape for Microsoft Graph.
#[derive(Debug, Deserialize)]
struct MicrosoftUserInfo {
    id: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    mail: Option<String>,
    #[serde(rename = "userPrincipalName")]
    user_principal_name: Option<String>,
}

impl From<MicrosoftUserInfo> for ProviderIdentity {
    fn from(info: MicrosoftUserInfo) -> Self {
        ProviderIdentity {
            subject_id: info.id,
            email: info.mail.or(info.user_principal_name),
            display_name: info.display_name,
            avatar_url: None,
        }
    }
}
