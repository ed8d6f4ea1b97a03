/// User administration endpoints (ADMIN only)
///
/// - `GET    /api/users` - list users
/// - `POST   /api/users` - create a user
/// - `PATCH  /api/users/:id` - change name and/or role
/// - `DELETE /api/users/:id` - delete a user (their tasks are kept)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{parse_id, ApiJson},
    routes::auth::create_account,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskmate_shared::models::{normalize_email, PublicUser, Role, UpdateUser};
use tracing::info;
use validator::Validate;

/// Admin create-user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
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

    pub role: Option<Role>,
}

/// Admin update-user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Name must not be blank"))]
    pub name: Option<String>,

    pub role: Option<Role>,
}

/// Lists all users, oldest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Creates a user with the given role
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `409 Conflict`: email already registered
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let req = CreateUserRequest {
        name: req.name.trim().to_string(),
        email: normalize_email(&req.email),
        ..req
    };
    req.validate()?;

    let user = create_account(
        &state,
        &req.name,
        &req.email,
        &req.password,
        req.role.unwrap_or_default(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Updates a user's name and/or role
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    let id = parse_id(&id, "User")?;

    let req = UpdateUserRequest {
        name: req.name.map(|name| name.trim().to_string()),
        ..req
    };
    req.validate()?;

    let user = state
        .store
        .update_user(
            id,
            UpdateUser {
                name: req.name,
                role: req.role,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %user.id, role = %user.role, "Updated user");
    Ok(Json(user.into()))
}

/// Deletes a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "User")?;

    if !state.store.delete_user(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
