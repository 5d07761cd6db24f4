// HTTP handlers for the product catalog

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::catalog::models::{CreateProduct, Product, ProductCreatedResponse};
use crate::catalog::repository::ProductRepository;
use crate::error::ApiError;
use crate::AppState;

/// Add a product to the catalog
#[utoipa::path(
    post,
    path = "/api/addproduct",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product added", body = ProductCreatedResponse),
        (status = 400, description = "Invalid input data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn add_product_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    tracing::debug!("Creating product: {}", payload.title);
    payload.validate()?;

    let product = state
        .products
        .create(payload)
        .await
        .map_err(|e| ApiError::storage("Internal server error", e))?;

    tracing::info!("Created product {}", product.id);
    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            message: "Product added successfully".to_string(),
            product,
        }),
    ))
}

/// List every product
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn list_products_handler(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .products
        .list()
        .await
        .map_err(|e| ApiError::storage("Internal server error", e))?;

    tracing::debug!("Retrieved {} products", products.len());
    Ok(Json(products))
}
