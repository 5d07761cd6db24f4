// In-process implementation of every repository trait
// Used by the test-suite and by STORAGE_BACKEND=memory for local runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{NewUser, User};
use crate::auth::repository::{TokenRepository, UserRepository};
use crate::cart::{Cart, CartRepository};
use crate::catalog::{CreateProduct, Product, ProductRepository};
use crate::error::StoreError;

/// Audit row kept by the memory store
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user_id: Uuid,
    pub token_hash: String,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// email -> user id; plays the role of the unique index
    emails: HashMap<String, Uuid>,
    carts: HashMap<Uuid, Cart>,
    /// user id -> cart id
    cart_owners: HashMap<Uuid, Uuid>,
    products: Vec<Product>,
    tokens: Vec<IssuedToken>,
}

/// Memory-backed store; one lock guards all tables
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the issuance audit log
    pub async fn issued_tokens(&self) -> Vec<IssuedToken> {
        self.tables.read().await.tokens.clone()
    }

    /// Remove a product from the catalog, leaving cart references untouched
    #[cfg(test)]
    pub async fn remove_product(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        tables.products.len() != before
    }

    /// Remove a user, leaving their cart and issued tokens in place
    #[cfg(test)]
    pub async fn remove_user(&self, id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.remove(&id) {
            Some(user) => {
                tables.emails.remove(&user.email);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_account(&self, new_user: NewUser) -> Result<(User, Cart), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.emails.contains_key(&new_user.email) {
            return Err(StoreError::Duplicate("users.email".to_string()));
        }

        let user_id = Uuid::new_v4();
        let cart = Cart::empty(user_id);
        let user = User {
            id: user_id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            cart_id: Some(cart.id),
            created_at: Utc::now(),
        };

        tables.emails.insert(user.email.clone(), user_id);
        tables.users.insert(user_id, user.clone());
        tables.cart_owners.insert(user_id, cart.id);
        tables.carts.insert(cart.id, cart.clone());

        Ok((user, cart))
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn record_issued(&self, user_id: Uuid, token_hash: &str) -> Result<(), StoreError> {
        self.tables.write().await.tokens.push(IssuedToken {
            user_id,
            token_hash: token_hash.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create(&self, product: CreateProduct) -> Result<Product, StoreError> {
        let product = Product {
            id: Uuid::new_v4(),
            title: product.title,
            image: product.image,
            description: product.description,
            price: product.price,
            category: product.category,
            count_in_stock: product.count_in_stock,
            created_at: Utc::now(),
        };
        self.tables.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.tables.read().await.products.clone())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_owners
            .get(&user_id)
            .and_then(|cart_id| tables.carts.get(cart_id))
            .cloned())
    }

    async fn append_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Cart>, StoreError> {
        // Under the write lock the push is atomic with respect to other appends
        let mut tables = self.tables.write().await;
        let Some(cart_id) = tables.cart_owners.get(&user_id).copied() else {
            return Ok(None);
        };
        match tables.carts.get_mut(&cart_id) {
            Some(cart) => {
                cart.products.push(product_id);
                Ok(Some(cart.clone()))
            }
            None => Err(StoreError::NotFound(format!("cart {}", cart_id))),
        }
    }

    async fn cart_products(&self, user_id: Uuid) -> Result<Option<Vec<Product>>, StoreError> {
        let tables = self.tables.read().await;
        let Some(cart) = tables
            .cart_owners
            .get(&user_id)
            .and_then(|cart_id| tables.carts.get(cart_id))
        else {
            return Ok(None);
        };

        let products = cart
            .products
            .iter()
            .filter_map(|id| tables.products.iter().find(|p| &p.id == id).cloned())
            .collect();

        Ok(Some(products))
    }
}
