// Product catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[schema(example = "Trail Runner")]
    pub title: String,
    #[schema(example = "https://cdn.example.com/trail-runner.jpg")]
    pub image: String,
    #[schema(example = "Lightweight running shoe")]
    pub description: String,
    #[schema(example = 89.99)]
    pub price: f64,
    #[schema(example = "shoes")]
    pub category: String,
    #[schema(example = 12)]
    pub count_in_stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Body of POST /api/addproduct
///
/// `price` defaults to 0 and `countInStock` to 1 when omitted.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(default = "default_count_in_stock")]
    #[validate(range(min = 0, message = "countInStock must not be negative"))]
    pub count_in_stock: i32,
}

fn default_count_in_stock() -> i32 {
    1
}

/// Response of POST /api/addproduct
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductCreatedResponse {
    pub message: String,
    pub product: Product,
}
