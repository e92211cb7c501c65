//! Repositories for account persistence

use std::future::Future;

use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::Account;

pub mod account;
#[cfg(test)]
pub mod memory;

pub use account::PgAccountRepository;

pub const USERNAME_CONSTRAINT: &str = "uq_accounts_username";
pub const EMAIL_CONSTRAINT: &str = "uq_accounts_email";

/// Persistence operations the account service depends on
///
/// Writes must report a taken username or email as
/// `DatabaseError::UniqueViolation` naming the matching constraint.
pub trait AccountStore: Send + Sync {
    fn exists_username(&self, username: &str) -> impl Future<Output = DatabaseResult<bool>> + Send;

    fn exists_email(&self, email: &str) -> impl Future<Output = DatabaseResult<bool>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = DatabaseResult<Option<Account>>> + Send;

    /// Look an account up by username or (normalized) email
    fn find_by_login(
        &self,
        login: &str,
    ) -> impl Future<Output = DatabaseResult<Option<Account>>> + Send;

    fn insert(&self, account: &Account) -> impl Future<Output = DatabaseResult<Account>> + Send;

    /// Overwrite every mutable column; `None` when no account has that id
    fn update(
        &self,
        account: &Account,
    ) -> impl Future<Output = DatabaseResult<Option<Account>>> + Send;
}
