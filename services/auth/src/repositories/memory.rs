//! In-memory account store used by unit tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AccountStore, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use crate::models::Account;

#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<Mutex<Vec<Account>>>,
    blind_checks: Arc<AtomicBool>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `exists_*` answer `false`, as if a concurrent writer committed
    /// between the check and the write
    pub fn blind_existence_checks(&self) {
        self.blind_checks.store(true, Ordering::SeqCst);
    }

    fn blind(&self) -> bool {
        self.blind_checks.load(Ordering::SeqCst)
    }
}

fn conflict(accounts: &[Account], account: &Account) -> Option<DatabaseError> {
    let others = accounts.iter().filter(|a| a.id != account.id);
    for other in others {
        let constraint = if other.username == account.username {
            USERNAME_CONSTRAINT
        } else if other.email == account.email {
            EMAIL_CONSTRAINT
        } else {
            continue;
        };
        return Some(DatabaseError::UniqueViolation {
            constraint: constraint.to_string(),
        });
    }
    None
}

impl AccountStore for InMemoryAccountStore {
    async fn exists_username(&self, username: &str) -> DatabaseResult<bool> {
        Ok(!self.blind() && self.accounts.lock().await.iter().any(|a| a.username == username))
    }

    async fn exists_email(&self, email: &str) -> DatabaseResult<bool> {
        Ok(!self.blind() && self.accounts.lock().await.iter().any(|a| a.email == email))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Account>> {
        Ok(self.accounts.lock().await.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> DatabaseResult<Option<Account>> {
        let email = login.to_lowercase();
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|a| a.username == login || a.email == email)
            .cloned())
    }

    async fn insert(&self, account: &Account) -> DatabaseResult<Account> {
        let mut accounts = self.accounts.lock().await;
        if let Some(e) = conflict(&accounts, account) {
            return Err(e);
        }
        accounts.push(account.clone());
        Ok(account.clone())
    }

    async fn update(&self, account: &Account) -> DatabaseResult<Option<Account>> {
        let mut accounts = self.accounts.lock().await;
        if let Some(e) = conflict(&accounts, account) {
            return Err(e);
        }
        Ok(accounts.iter_mut().find(|a| a.id == account.id).map(|a| {
            *a = account.clone();
            a.clone()
        }))
    }
}
