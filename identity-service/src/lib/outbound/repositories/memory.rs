use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Provider;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;

/// In-memory account store for integration tests.
///
/// Enforces the same uniqueness rules as the Postgres schema so handler
/// tests hit the same error paths without a live database.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn count(&self) -> usize {
        self.accounts
            .read()
            .expect("account store lock poisoned")
            .len()
    }

    /// Drop an account from the store.
    pub fn remove(&self, id: &AccountId) {
        self.accounts
            .write()
            .expect("account store lock poisoned")
            .remove(&id.0);
    }

    /// Mark an account inactive in place.
    pub fn deactivate(&self, id: &AccountId) {
        if let Some(account) = self
            .accounts
            .write()
            .expect("account store lock poisoned")
            .get_mut(&id.0)
        {
            account.is_active = false;
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: Account) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.write().expect("account store lock poisoned");

        for existing in accounts.values() {
            if existing
                .username
                .as_str()
                .eq_ignore_ascii_case(account.username.as_str())
            {
                return Err(AuthError::AccountExists(account.username.to_string()));
            }
            if existing
                .email
                .as_str()
                .eq_ignore_ascii_case(account.email.as_str())
            {
                return Err(AuthError::AccountExists(account.email.as_str().to_string()));
            }
            if account.federation.is_some() && existing.federation == account.federation {
                return Err(AuthError::AccountExists(account.email.as_str().to_string()));
            }
        }

        accounts.insert(account.id.0, account.clone());

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.read().expect("account store lock poisoned");

        Ok(accounts.get(&id.0).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.read().expect("account store lock poisoned");

        Ok(accounts
            .values()
            .find(|account| {
                account
                    .username
                    .as_str()
                    .eq_ignore_ascii_case(username.as_str())
            })
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.read().expect("account store lock poisoned");

        Ok(accounts
            .values()
            .find(|account| account.email.as_str().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_provider_identity(
        &self,
        provider: Provider,
        subject_id: &str,
    ) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.read().expect("account store lock poisoned");

        Ok(accounts
            .values()
            .find(|account| {
                account
                    .federation
                    .as_ref()
                    .is_some_and(|f| f.provider == provider && f.subject_id == subject_id)
            })
            .cloned())
    }

    async fn update(&self, account: Account) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.write().expect("account store lock poisoned");

        if !accounts.contains_key(&account.id.0) {
            return Err(AuthError::AccountNotFound(account.id.to_string()));
        }

        for existing in accounts.values() {
            if existing.id == account.id {
                continue;
            }
            if existing
                .username
                .as_str()
                .eq_ignore_ascii_case(account.username.as_str())
            {
                return Err(AuthError::AccountExists(account.username.to_string()));
            }
            if existing
                .email
                .as_str()
                .eq_ignore_ascii_case(account.email.as_str())
            {
                return Err(AuthError::AccountExists(account.email.as_str().to_string()));
            }
        }

        accounts.insert(account.id.0, account.clone());

        Ok(account)
    }
}
