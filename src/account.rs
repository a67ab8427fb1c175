/// Account data model
///
/// One record per registered identity. The password is only ever held as a
/// bcrypt hash and the live refresh token only as its SHA-256 digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles an account can be granted, with their wire codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Role {
    User,
    Editor,
    Admin,
}

impl Role {
    pub const fn code(self) -> i32 {
        match self {
            Role::User => 2001,
            Role::Editor => 1984,
            Role::Admin => 5150,
        }
    }
}

/// Role name to role code mapping carried by an account.
///
/// `User` is granted on creation; the others stay absent until granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    #[serde(rename = "User", skip_serializing_if = "Option::is_none")]
    pub user: Option<i32>,
    #[serde(rename = "Editor", skip_serializing_if = "Option::is_none")]
    pub editor: Option<i32>,
    #[serde(rename = "Admin", skip_serializing_if = "Option::is_none")]
    pub admin: Option<i32>,
}

impl Default for Roles {
    fn default() -> Self {
        Self {
            user: Some(Role::User.code()),
            editor: None,
            admin: None,
        }
    }
}

impl Roles {
    pub fn grant(&mut self, role: Role) {
        let slot = match role {
            Role::User => &mut self.user,
            Role::Editor => &mut self.editor,
            Role::Admin => &mut self.admin,
        };
        *slot = Some(role.code());
    }

    /// Granted codes in User, Editor, Admin order; absent or zero codes are skipped.
    pub fn codes(&self) -> Vec<i32> {
        [self.user, self.editor, self.admin]
            .into_iter()
            .flatten()
            .filter(|code| *code != 0)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Roles,
    /// SHA-256 digest of the single refresh token currently honoured
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// A freshly registered account: default roles, no session.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            roles: Roles::default(),
            refresh_token_hash: None,
            created_at: Utc::now(),
        }
    }
}

/// Role codes carried in tokens and returned to the client.
pub fn roles_of(account: &Account) -> Vec<i32> {
    account.roles.codes()
}

/// Public view of an account, safe to serialize to clients
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Roles,
    pub created_at: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            roles: account.roles.clone(),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}
