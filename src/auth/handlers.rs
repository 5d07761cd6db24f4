// HTTP handlers for authentication endpoints

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{CurrentUser, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
};
use crate::AppState;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Email already registered or invalid input"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    request.validate()?;

    let user_id = state
        .auth
        .register(&request.name, &request.email, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id,
        }),
    ))
}

/// Log in and receive a session token
///
/// The token is returned in the body and echoed in the `Authorization` header.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    request.validate()?;

    let outcome = state.auth.login(&request.email, &request.password).await?;

    let bearer = HeaderValue::from_str(&format!("Bearer {}", outcome.token))
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))?;

    let body = Json(LoginResponse {
        message: "Login successful".to_string(),
        name: outcome.name,
        email: outcome.email,
        token: outcome.token,
    });

    Ok(([(header::AUTHORIZATION, bearer)], body).into_response())
}

/// Identity attached to the current session (protected endpoint)
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUser),
        (status = 401, description = "Invalid token", body = String),
        (status = 403, description = "No token supplied", body = String)
    ),
    tag = "auth"
)]
pub async fn me_handler(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
