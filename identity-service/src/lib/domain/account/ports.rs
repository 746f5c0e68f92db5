use async_trait::async_trait;

use crate::account::errors::AuthError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Provider;
use crate::domain::account::models::ProviderIdentity;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::models::Username;

/// Inbound port for account and session operations.
///
/// This is the primary driver interface that HTTP handlers depend on.
/// Implementations orchestrate credential checks, federated identity
/// resolution, and account persistence.
#[async_trait]
pub trait IdentityResolver: Send + Sync + 'static {
    /// Register a new account with a local password credential.
    ///
    /// # Arguments
    /// * `command` - Validated registration data (username, email, password)
    ///
    /// # Returns
    /// The newly created account
    ///
    /// # Errors
    /// * `AccountExists` - Email or username is already taken
    /// * `Credential` - Password hashing failed
    /// * `Database` - Persistence failure
    async fn register_local(&self, command: RegisterCommand) -> Result<Account, AuthError>;

    /// Authenticate an account by email and password.
    ///
    /// Stamps the login timestamp on success.
    ///
    /// # Arguments
    /// * `email` - Email address identifying the account
    /// * `password` - Plain text password to verify
    ///
    /// # Returns
    /// The authenticated account
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, federated-only account, or wrong password
    /// * `InactiveAccount` - Credentials were correct but the account is deactivated
    /// * `Database` - Persistence failure
    async fn authenticate_local(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// Resolve a federated identity to an account, creating one on first login.
    ///
    /// Stamps the login timestamp in both cases.
    ///
    /// # Arguments
    /// * `provider` - Identity provider the identity came from
    /// * `identity` - Normalized userinfo payload for the account
    ///
    /// # Returns
    /// The existing or newly created account
    ///
    /// # Errors
    /// * `AccountExists` - A different account already owns the identity's email
    /// * `Database` - Persistence failure
    async fn resolve_oauth_identity(
        &self,
        provider: Provider,
        identity: ProviderIdentity,
    ) -> Result<Account, AuthError>;

    /// Fetch an account by its ID.
    ///
    /// # Arguments
    /// * `id` - Account ID to look up
    ///
    /// # Returns
    /// The account
    ///
    /// # Errors
    /// * `AccountNotFound` - No account with this ID exists
    /// * `Database` - Persistence failure
    async fn get_by_id(&self, id: &AccountId) -> Result<Account, AuthError>;

    /// Apply a partial profile update to an account.
    ///
    /// # Arguments
    /// * `id` - Account ID to update
    /// * `command` - Fields to change; absent fields are left untouched
    ///
    /// # Returns
    /// The updated account
    ///
    /// # Errors
    /// * `AccountNotFound` - No account with this ID exists
    /// * `AccountExists` - Requested username is already taken
    /// * `Database` - Persistence failure
    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<Account, AuthError>;
}

/// Outbound port for account persistence.
///
/// This is the driven interface the domain uses to reach storage.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Arguments
    /// * `account` - Account to insert
    ///
    /// # Returns
    /// The inserted account
    ///
    /// # Errors
    /// * `AccountExists` - Username, email, or federated identity is already taken
    /// * `Database` - Persistence failure
    async fn insert(&self, account: Account) -> Result<Account, AuthError>;

    /// Find an account by its ID.
    ///
    /// # Arguments
    /// * `id` - Account ID to look up
    ///
    /// # Returns
    /// The account if found, None otherwise
    ///
    /// # Errors
    /// * `Database` - Persistence failure
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AuthError>;

    /// Find an account by username, case-insensitively.
    ///
    /// # Arguments
    /// * `username` - Username to look up
    ///
    /// # Returns
    /// The account if found, None otherwise
    ///
    /// # Errors
    /// * `Database` - Persistence failure
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AuthError>;

    /// Find an account by email address, case-insensitively.
    ///
    /// # Arguments
    /// * `email` - Email address to look up
    ///
    /// # Returns
    /// The account if found, None otherwise
    ///
    /// # Errors
    /// * `Database` - Persistence failure
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Find an account by its federated identity.
    ///
    /// # Arguments
    /// * `provider` - Identity provider
    /// * `subject_id` - Provider-scoped subject identifier
    ///
    /// # Returns
    /// The account if found, None otherwise
    ///
    /// # Errors
    /// * `Database` - Persistence failure
    async fn find_by_provider_identity(
        &self,
        provider: Provider,
        subject_id: &str,
    ) -> Result<Option<Account>, AuthError>;

    /// Persist changes to an existing account.
    ///
    /// Federation fields are written at insert time only and are not
    /// touched by updates.
    ///
    /// # Arguments
    /// * `account` - Account with updated fields
    ///
    /// # Returns
    /// The updated account
    ///
    /// # Errors
    /// * `AccountNotFound` - No account with this ID exists
    /// * `AccountExists` - Username or email is already taken
    /// * `Database` - Persistence failure
    async fn update(&self, account: Account) -> Result<Account, AuthError>;
}
