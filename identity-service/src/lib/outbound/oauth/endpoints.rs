use crate::domain::account::models::Provider;

/// Endpoint set for one identity provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scope: String,
}

/// Endpoint sets for every supported provider.
///
/// The standard registry points at the live providers; tests swap in
/// stub servers.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    pub google: ProviderEndpoints,
    pub github: ProviderEndpoints,
    pub microsoft: ProviderEndpoints,
}

impl ProviderRegistry {
    /// Registry pointing at the live provider endpoints.
    pub fn standard() -> Self {
        Self {
            google: ProviderEndpoints {
                authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
                scope: "openid email profile".to_string(),
            },
            github: ProviderEndpoints {
                authorize_url: "https://github.com/login/oauth/authorize".to_string(),
                token_url: "https://github.com/login/oauth/access_token".to_string(),
                userinfo_url: "https://api.github.com/user".to_string(),
                scope: "read:user user:email".to_string(),
            },
            microsoft: ProviderEndpoints {
                authorize_url: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
                    .to_string(),
                token_url: "https://login.microsoftonline.com/common/oauth2/v2.0/token"
                    .to_string(),
                userinfo_url: "https://graph.microsoft.com/v1.0/me".to_string(),
                scope: "openid email profile".to_string(),
            },
        }
    }

    /// Endpoint set for the given provider.
    pub fn endpoints(&self, provider: Provider) -> &ProviderEndpoints {
        match provider {
            Provider::Google => &self.google,
            Provider::Github => &self.github,
            Provider::Microsoft => &self.microsoft,
        }
    }
}
