use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cart::models::Cart;
use crate::catalog::Product;
use crate::error::StoreError;

/// Persistence boundary for carts
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError>;

    /// Append a product reference in one atomic step
    ///
    /// Returns `None` when the user has no cart. Concurrent appends are never lost.
    async fn append_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Cart>, StoreError>;

    /// The cart's products as full documents, in cart order
    ///
    /// Duplicates are kept. References to products that no longer exist are
    /// skipped. Returns `None` when the user has no cart.
    async fn cart_products(&self, user_id: Uuid) -> Result<Option<Vec<Product>>, StoreError>;
}

/// PostgreSQL cart repository
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT id, user_id, products FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cart)
    }

    async fn append_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Cart>, StoreError> {
        // Single-statement append, no read-modify-write
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            UPDATE carts
            SET products = array_append(products, $2)
            WHERE user_id = $1
            RETURNING id, user_id, products
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    async fn cart_products(&self, user_id: Uuid) -> Result<Option<Vec<Product>>, StoreError> {
        let Some(cart) = self.find_by_user(user_id).await? else {
            return Ok(None);
        };

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.id, p.title, p.image, p.description, p.price, p.category, p.count_in_stock, p.created_at
            FROM unnest($1::uuid[]) WITH ORDINALITY AS item(product_id, position)
            JOIN products p ON p.id = item.product_id
            ORDER BY item.position
            "#,
        )
        .bind(&cart.products)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(products))
    }
}
