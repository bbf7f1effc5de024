use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another record already holds this email.
    #[error("duplicate key: email already present")]
    DuplicateKey,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user records. The store is the only authority on email
/// uniqueness: `insert` must fail with [`StoreError::DuplicateKey`] rather than
/// create a second record for an email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup, no normalization.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser<'_>) -> Result<User, StoreError>;
    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser<'_>) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash, created_at
            "#,
        )
        .bind(user.email)
        .bind(user.username)
        .bind(user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// SQLSTATE 23505: unique_violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
pub use memory::MemoryUserStore;
