/// Authentication endpoints
///
/// - `POST /api/auth/register` - create an account and sign in
/// - `POST /api/auth/login` - exchange credentials for a session token
/// - `GET  /api/auth/me` - the account behind the bearer token
///
/// Register and login both answer with `{ token, user }`, where `user` is
/// the public projection (no password hash).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskmate_shared::{
    auth::{middleware::AuthContext, password},
    models::{normalize_email, CreateUser, PublicUser, Role, User},
};
use tracing::{info, warn};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[serde(default)]
    pub name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,

    /// Defaults to `USER`; `ADMIN` is refused
    pub role: Option<Role>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Session token for the `Authorization: Bearer` header
    pub token: String,

    pub user: PublicUser,
}

/// Hashes the password and stores a new account
///
/// Shared by registration and admin user creation.
pub(crate) async fn create_account(
    state: &AppState,
    name: &str,
    email: &str,
    raw_password: &str,
    role: Role,
) -> ApiResult<User> {
    let password_hash = password::hash_password(raw_password)?;

    let user = state
        .store
        .create_user(CreateUser {
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            role,
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, "Created user");
    Ok(user)
}

/// Registers a new user
///
/// # Errors
///
/// - `400 Bad Request`: missing name, password, or malformed email
/// - `403 Forbidden`: role `ADMIN` requested
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let req = RegisterRequest {
        name: req.name.trim().to_string(),
        email: normalize_email(&req.email),
        ..req
    };
    req.validate()?;

    // Admin accounts are only created through `/api/users`.
    if req.role == Some(Role::Admin) {
        warn!(email = %req.email, "Rejected self-registration as ADMIN");
        return Err(ApiError::Forbidden(
            "Admin accounts can only be created by an admin".to_string(),
        ));
    }

    let user = create_account(
        &state,
        &req.name,
        &req.email,
        &req.password,
        req.role.unwrap_or_default(),
    )
    .await?;

    let token = state.issue_token(&user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Logs a user in
///
/// # Errors
///
/// - `404 Not Found`: no account with this email
/// - `401 Unauthorized`: wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let email = normalize_email(&req.email);
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.issue_token(&user.email)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Returns the user behind the bearer token
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store
        .find_user_by_email(&auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
