//! Account operations
//!
//! Authorization is decided from the `SessionData` passed in by the caller.

use common::{error::DatabaseError, session::SessionData};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::models::{
    Account, AccountResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UpdateEmailRequest, UpdateProfileRequest,
};
use crate::password::{hash_password, verify_password, verify_without_account};
use crate::rate_limiter::LoginThrottle;
use crate::repositories::{AccountStore, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use crate::validation::{
    normalize_email, validate_email, validate_password, validate_profile, validate_registration,
};

#[derive(Clone)]
pub struct AccountService<S> {
    store: S,
    throttle: LoginThrottle,
}

impl<S: AccountStore> AccountService<S> {
    pub fn new(store: S, throttle: LoginThrottle) -> Self {
        Self { store, throttle }
    }

    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AccountResponse> {
        let registration = validate_registration(request)?;

        if self.store.exists_username(&registration.username).await? {
            return Err(AuthError::Duplicate {
                field: "username",
                value: registration.username,
            });
        }
        if self.store.exists_email(&registration.email).await? {
            return Err(AuthError::Duplicate {
                field: "email",
                value: registration.email,
            });
        }

        let password_hash = hash_password(&registration.password)?;
        let account = Account::new(
            registration.username,
            registration.email,
            password_hash,
            registration.display_name,
        );

        let saved = self
            .store
            .insert(&account)
            .await
            .map_err(|e| duplicate_or(e, &account))?;

        info!("Registered account {}", saved.username);
        Ok(saved.into())
    }

    /// Check credentials and stamp the login
    ///
    /// Unknown logins and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, request: LoginRequest) -> AuthResult<Account> {
        let login = request.login.trim();
        let key = login.to_lowercase();

        if let Err(remaining) = self.throttle.check(&key).await {
            warn!("Login for {} refused while locked", key);
            return Err(AuthError::TooManyAttempts {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }

        let mut account = match self.store.find_by_login(login).await? {
            Some(account) if verify_password(&request.password, &account.password_hash)? => {
                account
            }
            found => {
                if found.is_none() {
                    verify_without_account(&request.password);
                }
                self.throttle.record_failure(&key).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !account.enabled {
            return Err(AuthError::AccountDisabled);
        }

        self.throttle.record_success(&key).await;

        account.record_login();
        let account = self
            .store
            .update(&account)
            .await?
            .ok_or_else(|| AuthError::NotFound(account.id.to_string()))?;

        info!("Account {} logged in", account.username);
        Ok(account)
    }

    pub async fn current(&self, actor: &SessionData) -> AuthResult<AccountResponse> {
        self.by_id(actor.user_id).await.map(AccountResponse::from)
    }

    pub async fn update_profile(
        &self,
        actor: &SessionData,
        target: Uuid,
        request: UpdateProfileRequest,
    ) -> AuthResult<AccountResponse> {
        if actor.user_id != target && !actor.is_admin() {
            return Err(AuthError::Forbidden);
        }

        let changes = validate_profile(request)?;
        let mut account = self.by_id(target).await?;

        if let Some(display_name) = changes.display_name {
            account.display_name = display_name;
        }
        if let Some(avatar_url) = changes.avatar_url {
            account.avatar_url = avatar_url;
        }
        account.touch();

        self.save(&account).await.map(AccountResponse::from)
    }

    /// Change the email; changing one's own requires the current password
    pub async fn update_email(
        &self,
        actor: &SessionData,
        target: Uuid,
        request: UpdateEmailRequest,
    ) -> AuthResult<AccountResponse> {
        let is_self = actor.user_id == target;
        if !is_self && !actor.is_admin() {
            return Err(AuthError::Forbidden);
        }

        let email = normalize_email(&request.email);
        validate_email(&email).map_err(|message| AuthError::validation("email", message))?;

        let mut account = self.by_id(target).await?;

        if is_self {
            let current = request.current_password.as_deref().unwrap_or_default();
            if current.is_empty() {
                return Err(AuthError::validation(
                    "current_password",
                    "Current password is required",
                ));
            }
            if !verify_password(current, &account.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
        }

        if email == account.email {
            return Ok(account.into());
        }
        if self.store.exists_email(&email).await? {
            return Err(AuthError::Duplicate {
                field: "email",
                value: email,
            });
        }

        account.email = email;
        account.touch();

        let saved = self.save(&account).await?;
        info!("Email of {} changed by {}", saved.username, actor.username);
        Ok(saved.into())
    }

    /// Self-service only; the old password must verify
    pub async fn change_password(
        &self,
        actor: &SessionData,
        target: Uuid,
        request: ChangePasswordRequest,
    ) -> AuthResult<()> {
        if actor.user_id != target {
            return Err(AuthError::Forbidden);
        }

        validate_password(&request.new_password)
            .map_err(|message| AuthError::validation("new_password", message))?;

        let mut account = self.by_id(target).await?;
        if !verify_password(&request.old_password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        account.password_hash = hash_password(&request.new_password)?;
        account.touch();
        self.save(&account).await?;

        info!("Password changed for {}", account.username);
        Ok(())
    }

    async fn by_id(&self, id: Uuid) -> AuthResult<Account> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))
    }

    async fn save(&self, account: &Account) -> AuthResult<Account> {
        self.store
            .update(account)
            .await
            .map_err(|e| duplicate_or(e, account))?
            .ok_or_else(|| AuthError::NotFound(account.id.to_string()))
    }
}

/// Map a unique violation raised by a write back to the field it guards
fn duplicate_or(e: DatabaseError, account: &Account) -> AuthError {
    match e.violated_constraint() {
        Some(USERNAME_CONSTRAINT) => AuthError::Duplicate {
            field: "username",
            value: account.username.clone(),
        },
        Some(EMAIL_CONSTRAINT) => AuthError::Duplicate {
            field: "email",
            value: account.email.clone(),
        },
        _ => AuthError::Database(e),
    }
}
