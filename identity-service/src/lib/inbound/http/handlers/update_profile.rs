use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::get_profile::ProfileData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::UsernameError;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::IdentityResolver;
use crate::inbound::http::middleware::CurrentAccount;
use crate::inbound::http::router::AppState;

pub async fn update_profile<AR: AccountRepository>(
    State(state): State<AppState<AR>>,
    Extension(current): Extension<CurrentAccount>,
    Json(body): Json<UpdateProfileRequestBody>,
) -> Result<ApiSuccess<ProfileData>, ApiError> {
    state
        .identity_service
        .update_profile(&current.0.id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

/// HTTP request body for a profile update; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileRequestBody {
    username: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseUpdateProfileRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),
}

impl UpdateProfileRequestBody {
    fn try_into_command(self) -> Result<UpdateProfileCommand, ParseUpdateProfileRequestError> {
        let username = self.username.map(Username::new).transpose()?;
        Ok(UpdateProfileCommand {
            username,
            avatar_url: self.avatar_url,
        })
    }
}

impl From<ParseUpdateProfileRequestError> for ApiError {
    fn from(err: ParseUpdateProfileRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
