pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    AuthService, PasswordService, PgTokenRepository, PgUserRepository, TokenRepository, TokenService,
    UserRepository,
};
use cart::{CartRepository, PgCartRepository};
use catalog::{PgProductRepository, ProductRepository};
use config::AppConfig;
use db::DbPool;
use memory::MemoryStore;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::me_handler,
        catalog::handlers::add_product_handler,
        catalog::handlers::list_products_handler,
        cart::handlers::add_to_cart_handler,
        cart::handlers::get_cart_items_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::RegisterResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::CurrentUser,
            catalog::Product,
            catalog::CreateProduct,
            catalog::ProductCreatedResponse,
            cart::Cart,
            cart::AddToCartRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session identity"),
        (name = "products", description = "Product catalog"),
        (name = "cart", description = "Per-user shopping cart (bearer token required)")
    ),
    info(
        title = "Shop API",
        version = "0.1.0",
        description = "E-commerce backend: accounts, products and carts"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartRepository>,
        config: &AppConfig,
    ) -> Self {
        let password_service = PasswordService::new(config.hash_algorithm, config.bcrypt_cost);
        let token_service = TokenService::with_ttl(&config.jwt_secret, config.token_ttl);

        Self {
            auth: Arc::new(AuthService::new(users, tokens, password_service, token_service)),
            products,
            carts,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: DbPool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTokenRepository::new(pool.clone())),
            Arc::new(PgProductRepository::new(pool.clone())),
            Arc::new(PgCartRepository::new(pool)),
            config,
        )
    }

    /// State backed by a single in-process store
    pub fn memory(store: Arc<MemoryStore>, config: &AppConfig) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store, config)
    }
}

/// Creates and configures the application router
///
/// Cart routes and `/api/me` sit behind `require_auth`; everything else is public.
pub fn create_router(state: AppState) -> Router {
    // Any origin, method and header is allowed
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([axum::http::header::AUTHORIZATION]);

    let protected = Router::new()
        .route("/api/addtocart", post(cart::add_to_cart_handler))
        .route("/api/getcartitems", post(cart::get_cart_items_handler))
        .route("/api/me", get(auth::me_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/register", post(auth::register_handler))
        .route("/api/login", post(auth::login_handler))
        .route("/api/addproduct", post(catalog::add_product_handler))
        .route("/api/products", get(catalog::list_products_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
