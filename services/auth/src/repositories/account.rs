//! PostgreSQL account repository

use common::{
    Role,
    error::{DatabaseError, DatabaseResult},
};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::AccountStore;
use crate::models::Account;

const ACCOUNT_COLUMNS: &str = r#"
    id, username, email, password_hash, display_name, avatar_url, role, is_enabled,
    created_at, updated_at, last_login_at
"#;

/// Account repository for database operations
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountStore for PgAccountRepository {
    async fn exists_username(&self, username: &str) -> DatabaseResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_email(&self, email: &str) -> DatabaseResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_login(&self, login: &str) -> DatabaseResult<Option<Account>> {
        info!("Finding account by username or email: {}", login);

        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE username = $1 OR email = lower($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert(&self, account: &Account) -> DatabaseResult<Account> {
        info!("Creating account: {}", account.username);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts ({columns})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {columns}
            "#,
            columns = ACCOUNT_COLUMNS
        ))
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.display_name)
        .bind(&account.avatar_url)
        .bind(account.role.as_str())
        .bind(account.enabled)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.last_login_at)
        .fetch_one(&self.pool)
        .await?;

        account_from_row(&row)
    }

    async fn update(&self, account: &Account) -> DatabaseResult<Option<Account>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts SET
                email = $2,
                password_hash = $3,
                display_name = $4,
                avatar_url = $5,
                role = $6,
                is_enabled = $7,
                updated_at = $8,
                last_login_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.display_name)
        .bind(&account.avatar_url)
        .bind(account.role.as_str())
        .bind(account.enabled)
        .bind(account.updated_at)
        .bind(account.last_login_at)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }
}

fn account_from_row(row: &PgRow) -> DatabaseResult<Account> {
    let role: String = row.try_get("role")?;

    Ok(Account {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        avatar_url: row.try_get("avatar_url")?,
        role: role
            .parse::<Role>()
            .map_err(|reason| DatabaseError::Decode {
                column: "role",
                reason,
            })?,
        enabled: row.try_get("is_enabled")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login_at: row.try_get("last_login_at")?,
    })
}
