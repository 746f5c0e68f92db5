use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::account::ports::AccountRepository;
use crate::account::ports::IdentityResolver;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Federation;
use crate::domain::account::models::Provider;
use crate::domain::account::models::ProviderIdentity;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::models::Username;

/// Length of the random suffix appended to generated usernames on collision.
const GENERATED_SUFFIX_LENGTH: usize = 8;

/// Domain service implementation for account and session operations.
///
/// Concrete implementation of IdentityResolver with dependency injection.
pub struct IdentityService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    credential_hasher: auth::CredentialHasher,
}

impl<AR> IdentityService<AR>
where
    AR: AccountRepository,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    ///
    /// # Returns
    /// Configured identity service instance
    pub fn new(repository: Arc<AR>) -> Self {
        Self {
            repository,
            credential_hasher: auth::CredentialHasher::new(),
        }
    }

    /// Hash a password without blocking the async workers.
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.credential_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    /// Verify a password against a stored hash without blocking the async workers.
    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.credential_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    /// Stamp the login timestamp and persist it.
    async fn record_login(&self, mut account: Account) -> Result<Account, AuthError> {
        let now = Utc::now();
        account.last_login_at = Some(now);
        account.updated_at = now;

        self.repository.update(account).await
    }

    /// Derive a username for a first federated login that is free in the store.
    async fn unique_username(
        &self,
        provider: Provider,
        identity: &ProviderIdentity,
    ) -> Result<Username, AuthError> {
        let seed = username_seed(provider, identity)?;

        if self.repository.find_by_username(&seed).await?.is_none() {
            return Ok(seed);
        }

        let stem: String = seed
            .as_str()
            .chars()
            .take(Username::MAX_LENGTH - GENERATED_SUFFIX_LENGTH - 1)
            .collect();
        let suffix = Uuid::new_v4().simple().to_string();

        let username = Username::new(format!(
            "{}-{}",
            stem,
            &suffix[..GENERATED_SUFFIX_LENGTH]
        ))?;

        Ok(username)
    }
}

#[async_trait]
impl<AR> IdentityResolver for IdentityService<AR>
where
    AR: AccountRepository,
{
    async fn register_local(&self, command: RegisterCommand) -> Result<Account, AuthError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::AccountExists(command.email.as_str().to_string()));
        }

        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(AuthError::AccountExists(command.username.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            username: command.username,
            email: command.email,
            password_hash: Some(password_hash),
            federation: None,
            avatar_url: None,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        self.repository.insert(account).await
    }

    async fn authenticate_local(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let account = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Federated-only accounts have no local credential to check.
        let password_hash = account
            .password_hash
            .clone()
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .verify_password(password.to_string(), password_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            return Err(AuthError::InactiveAccount);
        }

        self.record_login(account).await
    }

    async fn resolve_oauth_identity(
        &self,
        provider: Provider,
        identity: ProviderIdentity,
    ) -> Result<Account, AuthError> {
        if let Some(account) = self
            .repository
            .find_by_provider_identity(provider, &identity.subject_id)
            .await?
        {
            return self.record_login(account).await;
        }

        let username = self.unique_username(provider, &identity).await?;
        let email = match identity.email {
            Some(ref email) => EmailAddress::new(email.clone())?,
            None => EmailAddress::new(placeholder_email(provider, &identity.subject_id))?,
        };

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            username,
            email,
            password_hash: None,
            federation: Some(Federation {
                provider,
                subject_id: identity.subject_id.clone(),
            }),
            avatar_url: identity.avatar_url.clone(),
            is_active: true,
            is_verified: true,
            created_at: now,
            updated_at: now,
            last_login_at: Some(now),
        };

        match self.repository.insert(account).await {
            Ok(account) => {
                tracing::info!(
                    provider = %provider,
                    account_id = %account.id,
                    "Federated account created"
                );
                Ok(account)
            }
            // Two concurrent callbacks can race on the first login; the
            // loser resolves to whichever row won.
            Err(AuthError::AccountExists(reason)) => {
                match self
                    .repository
                    .find_by_provider_identity(provider, &identity.subject_id)
                    .await?
                {
                    Some(winner) => self.record_login(winner).await,
                    None => Err(AuthError::AccountExists(reason)),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Account, AuthError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound(id.to_string()))
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<Account, AuthError> {
        let mut account = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            account.username = new_username;
        }

        if let Some(new_avatar_url) = command.avatar_url {
            account.avatar_url = Some(new_avatar_url);
        }

        account.updated_at = Utc::now();

        self.repository.update(account).await
    }
}

/// Pick the username seed for a first federated login.
///
/// Prefers the display name, then the email local part. When neither
/// survives sanitization the provider name and subject ID are used.
fn username_seed(provider: Provider, identity: &ProviderIdentity) -> Result<Username, AuthError> {
    let candidates = [
        identity.display_name.as_deref(),
        identity
            .email
            .as_deref()
            .and_then(|email| email.split('@').next()),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(username) = Username::new(sanitize(candidate)) {
            return Ok(username);
        }
    }

    let username = Username::new(sanitize(&format!("{}-{}", provider, identity.subject_id)))?;

    Ok(username)
}

/// Strip characters a username cannot carry and cap the length.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(Username::MAX_LENGTH)
        .collect()
}

/// Synthetic address for providers that do not disclose an email.
fn placeholder_email(provider: Provider, subject_id: &str) -> String {
    format!("{}@{}.oauth.invalid", subject_id, provider)
}
