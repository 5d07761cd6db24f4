// Product catalog: plain create and list over the product store

pub mod handlers;
pub mod models;
pub mod repository;

pub use handlers::{add_product_handler, list_products_handler};
pub use models::{CreateProduct, Product, ProductCreatedResponse};
pub use repository::{PgProductRepository, ProductRepository};
