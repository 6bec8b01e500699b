//! Account lifecycle and authentication.

use crate::error::{AccountError, AccountResult};
use crate::token::{generate_token, hash_token};
use chrono::Utc;
use novelforge_storage::{NotificationOutbox, ProfileDirectory, SecurityEventLog, StorageError};
use novelforge_types::security::{LOGIN_FAILURE, UNKNOWN_IP};
use novelforge_types::{
    NewSecurityEvent, Notification, NotificationKind, Principal, Profile, Role, Severity, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// A new account together with its first bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedAccount {
    pub profile: Profile,
    /// Shown once; only its hash is stored.
    pub token: String,
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

/// Creates accounts, issues tokens and resolves them back to principals.
pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> AccountService<S>
where
    S: ProfileDirectory + NotificationOutbox + SecurityEventLog,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates the first administrator. Fails once any admin exists.
    pub fn bootstrap_admin(&self, email: &str, full_name: &str) -> AccountResult<IssuedAccount> {
        let profile = Profile::new(
            normalize_email(email)?,
            normalize_name(full_name)?,
            Role::Admin,
        );

        let inserted = self.store.insert_first_admin(&profile).map_err(email_conflict)?;
        if !inserted {
            warn!("bootstrap refused: an administrator already exists");
            return Err(AccountError::AdminExists);
        }

        self.store.push_notification(&Notification::new(
            profile.id,
            "Welcome to NovelForge Sentinel",
            "Your administrator account is ready. You now have access to every management feature.",
            NotificationKind::Success,
            json!({ "welcome": true, "setupComplete": true }),
        ))?;

        let token = self.issue_token(profile.id)?;
        info!(user_id = %profile.id, "administrator bootstrapped");
        Ok(IssuedAccount { profile, token })
    }

    /// Creates an account whose role is strictly below the creator's.
    pub fn create_user(
        &self,
        principal: &Principal,
        account: NewAccount,
    ) -> AccountResult<IssuedAccount> {
        principal.require(Role::Reseller)?;
        if account.role >= principal.role {
            return Err(AccountError::RoleNotPermitted {
                creator: principal.role,
                requested: account.role,
            });
        }

        let mut profile = Profile::new(
            normalize_email(&account.email)?,
            normalize_name(&account.full_name)?,
            account.role,
        );
        if principal.role == Role::Reseller {
            profile.reseller_id = Some(principal.user_id);
        }

        self.store.insert_profile(&profile).map_err(email_conflict)?;
        let token = self.issue_token(profile.id)?;

        info!(
            user_id = %profile.id,
            role = %profile.role,
            created_by = %principal.user_id,
            "account created"
        );
        Ok(IssuedAccount { profile, token })
    }

    /// Changes another account's role. Admin only.
    pub fn update_user_role(
        &self,
        principal: &Principal,
        target: UserId,
        role: Role,
    ) -> AccountResult<Profile> {
        principal.require(Role::Admin)?;
        let profile = self
            .store
            .update_role(target, role)?
            .ok_or(AccountError::UserNotFound)?;
        info!(user_id = %target, %role, changed_by = %principal.user_id, "role updated");
        Ok(profile)
    }

    /// Issues and stores a fresh token for `user_id`, returning the plaintext.
    pub fn issue_token(&self, user_id: UserId) -> AccountResult<String> {
        let token = generate_token();
        self.store.store_token(&hash_token(&token), user_id, Utc::now())?;
        Ok(token)
    }

    /// Resolves a bearer token to its principal.
    ///
    /// An unknown token is logged as a `login_failure` event from
    /// `source_ip` before the caller is refused.
    pub fn authenticate(&self, token: &str, source_ip: Option<&str>) -> AccountResult<Principal> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AccountError::Unauthenticated);
        }

        if let Some(profile) = self.store.profile_for_token(&hash_token(token))? {
            return Ok(Principal::new(profile.id, profile.role));
        }

        let ip = source_ip.unwrap_or(UNKNOWN_IP);
        self.store.append_event(
            NewSecurityEvent::new(LOGIN_FAILURE, Severity::Low)
                .with_source_ip(Some(ip.to_string()))
                .with_description("invalid bearer token presented"),
        )?;
        warn!(source_ip = ip, "authentication failed");
        Err(AccountError::Unauthenticated)
    }
}

fn email_conflict(err: StorageError) -> AccountError {
    match err {
        StorageError::Conflict(_) => AccountError::EmailTaken,
        other => AccountError::Storage(other),
    }
}

fn normalize_email(email: &str) -> AccountResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AccountError::InvalidRequest(
            "email must be a valid address".to_string(),
        )),
    }
}

fn normalize_name(name: &str) -> AccountResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AccountError::InvalidRequest(
            "fullName must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}
