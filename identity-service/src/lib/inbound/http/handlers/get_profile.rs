use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::Account;
use crate::inbound::http::middleware::CurrentAccount;

pub async fn get_profile(
    Extension(current): Extension<CurrentAccount>,
) -> Result<ApiSuccess<ProfileData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&current.0).into()))
}

/// Full profile view of the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub auth_provider: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&Account> for ProfileData {
    fn from(account: &Account) -> Self {
        let auth_provider = account
            .federation
            .as_ref()
            .map(|federation| federation.provider.to_string())
            .unwrap_or_else(|| "local".to_string());

        Self {
            id: account.id.to_string(),
            username: account.username.as_str().to_string(),
            email: account.email.as_str().to_string(),
            avatar_url: account.avatar_url.clone(),
            auth_provider,
            is_active: account.is_active,
            is_verified: account.is_verified,
            created_at: account.created_at,
            last_login_at: account.last_login_at,
        }
    }
}
