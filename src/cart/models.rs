// Shopping cart models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One user's cart: an ordered list of product references
///
/// Duplicates are allowed and there is no quantity field. References are not
/// checked against the catalog, so a deleted product leaves a dangling id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub products: Vec<Uuid>,
}

impl Cart {
    /// An empty cart owned by `user_id`
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            products: Vec::new(),
        }
    }
}

/// Body of POST /api/addtocart
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
}
