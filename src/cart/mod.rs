pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::{add_to_cart_handler, get_cart_items_handler};
pub use models::{AddToCartRequest, Cart};
pub use repository::{CartRepository, PgCartRepository};
