use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::CurrentAccount;

/// Acknowledge a logout.
///
/// Tokens are stateless, so there is nothing to revoke server side;
/// clients discard their token pair.
pub async fn logout(
    Extension(current): Extension<CurrentAccount>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    tracing::info!(account_id = %current.0.id, "Account logged out");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Logged out successfully".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
