/// Session Manager
///
/// Orchestrates registration, login, refresh and logout over the credential
/// store, the password hasher and the token issuer. It owns the rule that an
/// account has at most one live refresh token: login overwrites the stored
/// digest, logout clears it, and refresh only honours a token whose digest is
/// the one on record.

use std::sync::Arc;
use uuid::Uuid;

use crate::account::{roles_of, Account};
use crate::auth::{
    generate_access_token, generate_refresh_token, hash_password, hash_token,
    validate_refresh_token, verify_password, UserInfo,
};
use crate::configuration::{HashingSettings, JwtSettings};
use crate::error::{AppError, AuthError, ErrorContext, StoreError};
use crate::store::CredentialStore;
use crate::validators::NewAccountInput;

// Verified against when the email is unknown so both login failures cost a bcrypt round.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// Tokens handed out by a successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub roles: Vec<i32>,
}

/// Access token handed out by a successful refresh
#[derive(Debug)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub roles: Vec<i32>,
}

/// What logout found; every variant is a success for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// No session cookie was presented
    NoSession,
    /// A cookie was presented but matched no account
    UnknownSession,
    /// The matching account's refresh token was cleared
    Revoked,
}

pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    jwt: JwtSettings,
    hashing: HashingSettings,
    decoy_hash: String,
}

impl SessionManager {
    /// # Errors
    /// Fails if the decoy hash cannot be computed with the configured cost
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt: JwtSettings,
        hashing: HashingSettings,
    ) -> Result<Self, AppError> {
        let decoy_hash = hash_password(DECOY_PASSWORD, hashing.cost)?;
        Ok(Self {
            store,
            jwt,
            hashing,
            decoy_hash,
        })
    }

    pub fn jwt_settings(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Create an account with the default `User` role and return its id.
    ///
    /// # Errors
    /// - `AppError::Conflict` if the email is already registered
    /// - `AppError::Internal` for any hashing or store failure; no account is left behind
    pub async fn register(&self, input: NewAccountInput) -> Result<Uuid, AppError> {
        let context = ErrorContext::new("register");

        let existing = self.store.find_by_email(&input.email).await.map_err(|e| {
            context.log_error(&e);
            AppError::Internal("account lookup failed".to_string())
        })?;
        if existing.is_some() {
            return Err(StoreError::Conflict.into());
        }

        let cost = self.hashing.cost;
        let password = input.password;
        let password_hash = run_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| {
                context.log_error(&e);
                AppError::Internal("account creation failed".to_string())
            })?;

        let account = Account::new(input.name, input.email, password_hash);
        let account = match self.store.create(account).await {
            Ok(account) => account,
            // Lost a race with a concurrent registration of the same email
            Err(StoreError::Conflict) => return Err(StoreError::Conflict.into()),
            Err(e) => {
                context.log_error(&e);
                return Err(AppError::Internal("account creation failed".to_string()));
            }
        };

        tracing::info!(
            request_id = %context.request_id,
            account_id = %account.id,
            "Account registered"
        );

        Ok(account.id)
    }

    /// Verify credentials and mint an access/refresh token pair.
    ///
    /// The refresh token's digest replaces whatever was stored on the
    /// account, which invalidates any earlier session.
    ///
    /// # Errors
    /// - `AuthError::MissingCredentials` if either field is empty
    /// - `AuthError::InvalidCredentials` for an unknown email or a wrong password alike
    /// - `AuthError::LoginFailed` if anything fails after the credentials are checked
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }
        let context = ErrorContext::new("login");

        let account = self.store.find_by_email(email).await.map_err(|e| {
            context.log_error(&e);
            AppError::from(AuthError::LoginFailed)
        })?;

        let stored_hash = account
            .as_ref()
            .map(|account| account.password_hash.clone())
            .unwrap_or_else(|| self.decoy_hash.clone());
        let password = password.to_string();
        let password_valid = run_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| {
                context.log_error(&e);
                AppError::from(AuthError::LoginFailed)
            })?;

        let account = match account {
            Some(account) if password_valid => account,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };
        let context = context.with_account_id(account.id);

        let roles = roles_of(&account);
        let issued = generate_access_token(
            user_info(&account, roles.clone()),
            self.jwt.access_token_expiry,
            &self.jwt,
        )
        .and_then(|access_token| {
            generate_refresh_token(&account.email, &self.jwt)
                .map(|refresh_token| (access_token, refresh_token))
        });
        let (access_token, refresh_token) = issued.map_err(|e| {
            context.log_error(&e);
            AppError::from(AuthError::LoginFailed)
        })?;

        self.store
            .set_refresh_token(account.id, &hash_token(&refresh_token))
            .await
            .map_err(|e| {
                context.log_error(&e);
                AppError::from(AuthError::LoginFailed)
            })?;

        tracing::info!(
            request_id = %context.request_id,
            account_id = %account.id,
            "Account logged in"
        );

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            roles,
        })
    }

    /// Redeem the session's refresh token for a new access token.
    ///
    /// Roles come from the account as it is now, not from any earlier token.
    /// The new access token lives `refreshed_access_token_expiry` seconds.
    ///
    /// # Errors
    /// - `AuthError::MissingToken` if no token was presented
    /// - `AuthError::Forbidden` if the token is not the one on record, fails
    ///   verification, or names a different email than the account
    /// - `AuthError::RefreshFailed` if the store lookup or token signing fails
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<RefreshOutcome, AppError> {
        let refresh_token = refresh_token.ok_or(AuthError::MissingToken)?;
        let context = ErrorContext::new("refresh");

        let account = self
            .store
            .find_by_refresh_token(&hash_token(refresh_token))
            .await
            .map_err(|e| {
                context.log_error(&e);
                AppError::from(AuthError::RefreshFailed)
            })?
            .ok_or(AuthError::Forbidden)?;

        let claims = validate_refresh_token(refresh_token, &self.jwt)?;
        if claims.email != account.email {
            tracing::warn!(
                request_id = %context.request_id,
                account_id = %account.id,
                "Refresh token email does not match session owner"
            );
            return Err(AuthError::Forbidden.into());
        }

        let roles = roles_of(&account);
        let access_token = generate_access_token(
            user_info(&account, roles.clone()),
            self.jwt.refreshed_access_token_expiry,
            &self.jwt,
        )
        .map_err(|e| {
            context.log_error(&e);
            AppError::from(AuthError::RefreshFailed)
        })?;

        tracing::debug!(
            request_id = %context.request_id,
            account_id = %account.id,
            "Access token refreshed"
        );

        Ok(RefreshOutcome {
            access_token,
            roles,
        })
    }

    /// Revoke the session behind `refresh_token`, if any.
    ///
    /// Never fails: store errors are logged and reported as an unknown
    /// session so the caller still clears the cookie.
    pub async fn logout(&self, refresh_token: Option<&str>) -> LogoutOutcome {
        let Some(refresh_token) = refresh_token else {
            return LogoutOutcome::NoSession;
        };
        let context = ErrorContext::new("logout");

        // Only clears the digest if it is still this token's, so a logout
        // racing a newer login leaves the newer session alone.
        match self.store.clear_refresh_token(&hash_token(refresh_token)).await {
            Ok(Some(account_id)) => {
                tracing::info!(
                    request_id = %context.request_id,
                    account_id = %account_id,
                    "Session revoked"
                );
                LogoutOutcome::Revoked
            }
            Ok(None) => LogoutOutcome::UnknownSession,
            Err(e) => {
                context.log_error(&e);
                LogoutOutcome::UnknownSession
            }
        }
    }
}

fn user_info(account: &Account, roles: Vec<i32>) -> UserInfo {
    UserInfo {
        email: account.email.clone(),
        name: account.name.clone(),
        roles,
    }
}

/// Runs CPU-bound work (bcrypt) on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}
