// HTTP handlers for the per-user cart (both behind require_auth)

use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::cart::models::{AddToCartRequest, Cart};
use crate::cart::repository::CartRepository;
use crate::catalog::Product;
use crate::error::ApiError;
use crate::AppState;

/// Append a product reference to the caller's cart
#[utoipa::path(
    post,
    path = "/api/addtocart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "No token supplied"),
        (status = 404, description = "Cart not found for the user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "cart"
)]
pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state
        .carts
        .append_product(user.id, request.product_id)
        .await
        .map_err(|e| ApiError::storage("An error occurred while updating the cart", e))?
        .ok_or_else(|| ApiError::NotFound("Cart not found for the user".to_string()))?;

    tracing::debug!("Added product {} to cart {}", request.product_id, cart.id);
    Ok(Json(cart))
}

/// The caller's cart contents as full product documents
#[utoipa::path(
    post,
    path = "/api/getcartitems",
    responses(
        (status = 200, description = "Products in the cart", body = Vec<Product>),
        (status = 401, description = "Invalid token"),
        (status = 403, description = "No token supplied"),
        (status = 404, description = "Cart not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "cart"
)]
pub async fn get_cart_items_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .carts
        .cart_products(user.id)
        .await
        .map_err(|e| ApiError::storage("An error occurred while retrieving the cart items", e))?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

    Ok(Json(products))
}
