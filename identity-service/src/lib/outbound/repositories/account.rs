use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Federation;
use crate::domain::account::models::Provider;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;

/// Row shape of the accounts table.
#[derive(Debug, sqlx::FromRow)]
struct AccountRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: Option<String>,
    auth_provider: Option<String>,
    auth_provider_id: Option<String>,
    avatar_url: Option<String>,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRecord> for Account {
    type Error = AuthError;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        // The schema forces the federation columns to be set as a pair.
        let federation = match (record.auth_provider, record.auth_provider_id) {
            (Some(provider), Some(subject_id)) => Some(Federation {
                provider: provider.parse::<Provider>()?,
                subject_id,
            }),
            (None, None) => None,
            _ => {
                return Err(AuthError::Database(format!(
                    "Account {} has a partial federation record",
                    record.id
                )))
            }
        };

        Ok(Account {
            id: AccountId(record.id),
            username: Username::new(record.username)?,
            email: EmailAddress::new(record.email)?,
            password_hash: record.password_hash,
            federation,
            avatar_url: record.avatar_url,
            is_active: record.is_active,
            is_verified: record.is_verified,
            created_at: record.created_at,
            updated_at: record.updated_at,
            last_login_at: record.last_login_at,
        })
    }
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert(&self, account: Account) -> Result<Account, AuthError> {
        let (auth_provider, auth_provider_id) = federation_columns(&account);

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, email, password_hash,
                auth_provider, auth_provider_id, avatar_url,
                is_active, is_verified, created_at, updated_at, last_login_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_deref())
        .bind(auth_provider)
        .bind(auth_provider_id)
        .bind(account.avatar_url.as_deref())
        .bind(account.is_active)
        .bind(account.is_verified)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &account))?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AuthError> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, username, email, password_hash,
                   auth_provider, auth_provider_id, avatar_url,
                   is_active, is_verified, created_at, updated_at, last_login_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        record.map(Account::try_from).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AuthError> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, username, email, password_hash,
                   auth_provider, auth_provider_id, avatar_url,
                   is_active, is_verified, created_at, updated_at, last_login_at
            FROM accounts
            WHERE lower(username) = lower($1)
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        record.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, username, email, password_hash,
                   auth_provider, auth_provider_id, avatar_url,
                   is_active, is_verified, created_at, updated_at, last_login_at
            FROM accounts
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        record.map(Account::try_from).transpose()
    }

    async fn find_by_provider_identity(
        &self,
        provider: Provider,
        subject_id: &str,
    ) -> Result<Option<Account>, AuthError> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, username, email, password_hash,
                   auth_provider, auth_provider_id, avatar_url,
                   is_active, is_verified, created_at, updated_at, last_login_at
            FROM accounts
            WHERE auth_provider = $1 AND auth_provider_id = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        record.map(Account::try_from).transpose()
    }

    async fn update(&self, account: Account) -> Result<Account, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET username = $2, email = $3, password_hash = $4, avatar_url = $5,
                is_active = $6, is_verified = $7, updated_at = $8, last_login_at = $9
            WHERE id = $1
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_deref())
        .bind(account.avatar_url.as_deref())
        .bind(account.is_active)
        .bind(account.is_verified)
        .bind(account.updated_at)
        .bind(account.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &account))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound(account.id.to_string()));
        }

        Ok(account)
    }
}

fn federation_columns(account: &Account) -> (Option<&'static str>, Option<&str>) {
    match &account.federation {
        Some(federation) => (
            Some(federation.provider.as_str()),
            Some(federation.subject_id.as_str()),
        ),
        None => (None, None),
    }
}

fn map_unique_violation(e: sqlx::Error, account: &Account) -> AuthError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("accounts_username_key") {
                return AuthError::AccountExists(account.username.as_str().to_string());
            }
            if db_err.constraint() == Some("accounts_email_key") {
                return AuthError::AccountExists(account.email.as_str().to_string());
            }
            if db_err.constraint() == Some("accounts_provider_identity_key") {
                if let Some(federation) = &account.federation {
                    return AuthError::AccountExists(format!(
                        "{}:{}",
                        federation.provider, federation.subject_id
                    ));
                }
            }
        }
    }
    AuthError::Database(e.to_string())
}
