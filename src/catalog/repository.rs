use async_trait::async_trait;
use sqlx::PgPool;

use crate::catalog::models::{CreateProduct, Product};
use crate::error::StoreError;

/// Persistence boundary for catalog entries
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: CreateProduct) -> Result<Product, StoreError>;

    /// All products, oldest first
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}

/// PostgreSQL product repository
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: CreateProduct) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, title, image, description, price, category, count_in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, image, description, price, category, count_in_stock, created_at
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(&product.title)
        .bind(&product.image)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(product.count_in_stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, image, description, price, category, count_in_stock, created_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}
