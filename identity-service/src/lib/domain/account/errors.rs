use thiserror::Error;

/// Errors that can occur when parsing an account ID.
#[derive(Debug, Clone, Error)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur when validating a username.
#[derive(Debug, Clone, Error)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains invalid characters (only ASCII alphanumeric, _ and - allowed)")]
    InvalidCharacters,
}

/// Errors that can occur when validating an email address.
#[derive(Debug, Clone, Error)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur when parsing a provider name.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Unsupported provider: {0}")]
    Unsupported(String),
}

/// Top-level authentication and account management errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    UnsupportedProvider(#[from] ProviderError),

    #[error("Password error: {0}")]
    Credential(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Authentication with provider failed: {0}")]
    UpstreamAuth(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(e: anyhow::Error) -> Self {
        AuthError::Unknown(e.to_string())
    }
}
