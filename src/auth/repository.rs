// Credential store and token audit store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::models::{NewUser, User};
use crate::cart::Cart;
use crate::error::StoreError;

/// Persistence boundary for user identities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive match on the stored email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Create the identity, its empty cart, and link the two as one unit
    ///
    /// A taken email yields `StoreError::Duplicate` and nothing is written.
    async fn create_account(&self, user: NewUser) -> Result<(User, Cart), StoreError>;
}

/// Write-only audit log of issued session tokens
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn record_issued(&self, user_id: Uuid, token_hash: &str) -> Result<(), StoreError>;
}

const USER_COLUMNS: &str = "id, name, email, password_hash, cart_id, created_at";

/// PostgreSQL user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate("users.email".to_string());
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_account(&self, user: NewUser) -> Result<(User, Cart), StoreError> {
        // Rolled back on drop if any step fails
        let mut tx = self.pool.begin().await?;
        let user_id = Uuid::new_v4();

        sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (id, user_id) VALUES ($1, $2) RETURNING id, user_id, products",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET cart_id = $1 WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(cart.id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((created, cart))
    }
}

/// PostgreSQL token audit repository
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn record_issued(&self, user_id: Uuid, token_hash: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO auth_tokens (user_id, token_hash) VALUES ($1, $2)")
            .bind(user_id)
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
