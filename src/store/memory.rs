use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::CredentialStore;
use crate::account::{Account, Role};
use crate::error::StoreError;

/// Process-local store used when no database is configured, and in tests.
///
/// Every operation takes the lock once, so each call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Account>>, StoreError> {
        self.accounts
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts()?
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn find_by_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts()?
            .values()
            .find(|account| account.refresh_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts()?;
        if accounts.values().any(|existing| existing.email == account.email) {
            return Err(StoreError::Conflict);
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn set_refresh_token(&self, id: Uuid, token_hash: &str) -> Result<(), StoreError> {
        match self.accounts()?.get_mut(&id) {
            Some(stored) => {
                stored.refresh_token_hash = Some(token_hash.to_string());
                Ok(())
            }
            None => Err(StoreError::Query(format!("account {} not found", id))),
        }
    }

    async fn clear_refresh_token(&self, token_hash: &str) -> Result<Option<Uuid>, StoreError> {
        let mut accounts = self.accounts()?;
        let stored = accounts
            .values_mut()
            .find(|account| account.refresh_token_hash.as_deref() == Some(token_hash));
        Ok(stored.map(|account| {
            account.refresh_token_hash = None;
            account.id
        }))
    }

    async fn grant_role(&self, id: Uuid, role: Role) -> Result<bool, StoreError> {
        match self.accounts()?.get_mut(&id) {
            Some(stored) => {
                stored.roles.grant(role);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts()?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self.accounts()?.values().cloned().collect();
        accounts.sort_by_key(|account| account.created_at);
        Ok(accounts)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.accounts()?.remove(&id).is_some())
    }
}
