// Authentication module
// Password hashing, session tokens, registration/login and the identity middleware

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, me_handler, register_handler};
pub use middleware::{extract_token, require_auth, TokenSource};
pub use models::{CurrentUser, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User};
pub use password::{HashAlgorithm, PasswordService};
pub use repository::{PgTokenRepository, PgUserRepository, TokenRepository, UserRepository};
pub use service::AuthService;
pub use token::{Claims, TokenService};
