use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use super::CredentialStore;
use crate::account::{Account, Role, Roles};
use crate::configuration::DatabaseSettings;
use crate::error::StoreError;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role_user, role_editor, \
     role_admin, refresh_token_hash, created_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role_user: Option<i32>,
    role_editor: Option<i32>,
    role_admin: Option<i32>,
    refresh_token_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            roles: Roles {
                user: row.role_user,
                editor: row.role_editor,
                admin: row.role_admin,
            },
            refresh_token_hash: row.refresh_token_hash,
            created_at: row.created_at,
        }
    }
}

/// `accounts` table backed store; schema lives in `migrations/`.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool with a bounded acquire timeout, so a
    /// dead database fails requests instead of hanging them.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
            .connect_lazy(&settings.connection_string())?;
        Ok(Self::new(pool))
    }

    async fn fetch_one_by(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE {} = $1",
            ACCOUNT_COLUMNS, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_one_by("email", email).await
    }

    async fn find_by_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.fetch_one_by("refresh_token_hash", token_hash).await
    }

    async fn create(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, role_user, role_editor,
                                  role_admin, refresh_token_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.roles.user)
        .bind(account.roles.editor)
        .bind(account.roles.admin)
        .bind(&account.refresh_token_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(account)
    }

    async fn set_refresh_token(&self, id: Uuid, token_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE accounts SET refresh_token_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Query(format!("account {} not found", id)));
        }
        Ok(())
    }

    async fn clear_refresh_token(&self, token_hash: &str) -> Result<Option<Uuid>, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE accounts
            SET refresh_token_hash = NULL
            WHERE refresh_token_hash = $1
            RETURNING id
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn grant_role(&self, id: Uuid, role: Role) -> Result<bool, StoreError> {
        let column = match role {
            Role::User => "role_user",
            Role::Editor => "role_editor",
            Role::Admin => "role_admin",
        };
        let result = sqlx::query(&format!("UPDATE accounts SET {} = $2 WHERE id = $1", column))
            .bind(id)
            .bind(role.code())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts ORDER BY created_at",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
