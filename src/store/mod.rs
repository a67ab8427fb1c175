/// Credential Store
///
/// Keyed record store holding one `Account` per identity. The session layer
/// only talks to the trait; the backing engine is chosen at startup.
///
/// Updates touch one field each and are single conditional writes, so two
/// requests racing on the same account cannot write back a stale snapshot.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::account::{Account, Role};
use crate::error::StoreError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Lookup by the SHA-256 digest of the account's current refresh token.
    async fn find_by_refresh_token(&self, token_hash: &str)
        -> Result<Option<Account>, StoreError>;

    /// Insert a new account; `StoreError::Conflict` if the email is taken.
    async fn create(&self, account: Account) -> Result<Account, StoreError>;

    /// Replace the account's refresh token digest, leaving every other field
    /// untouched. `StoreError::Query` if no account has this id.
    async fn set_refresh_token(&self, id: Uuid, token_hash: &str) -> Result<(), StoreError>;

    /// Clear the refresh token digest only if it still equals `token_hash`.
    /// Returns the id of the account that was signed out, if any.
    async fn clear_refresh_token(&self, token_hash: &str) -> Result<Option<Uuid>, StoreError>;

    /// Add `role` to the account's roles. Returns `false` when no account had this id.
    async fn grant_role(&self, id: Uuid, role: Role) -> Result<bool, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    /// Returns `false` when no account had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
