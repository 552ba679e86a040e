// src/handlers/auth.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{Caller, CreateUserRequest, LoginRequest, Role, UpdateUserRequest},
    stores::{UserStore, user_store::NewUser},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

fn parse_role(raw: &str) -> Result<Role, AppError> {
    Role::resolve(raw).ok_or_else(|| AppError::Validation(format!("unrecognized user type '{}'", raw)))
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the new user id.
pub async fn register(
    State(users): State<UserStore>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let role = parse_role(&payload.role)?;

    let hashed_password = hash_password(&payload.password)?;

    let id = users
        .create(NewUser {
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            email: &payload.email,
            password_hash: Some(&hashed_password),
            role,
        })
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("Email '{}' already exists", payload.email))
            }
            other => {
                tracing::error!("Failed to register user: {:?}", other);
                other
            }
        })?;

    tracing::info!(user_id = id, %role, "User registered");
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(users): State<UserStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users
        .fetch_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// Updates the caller's own account. The password is replaced only when sent.
/// Students cannot change their user type.
pub async fn update_user(
    State(users): State<UserStore>,
    caller: Caller,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if caller.user_id != user_id {
        return Err(AppError::Forbidden("You can only update your own account".to_string()));
    }
    payload.validate()?;
    let role = parse_role(&payload.role)?;
    if role != caller.role && caller.role != Role::Teacher {
        return Err(AppError::Forbidden("You cannot change your own user type".to_string()));
    }

    let hashed_password = payload.password.as_deref().map(hash_password).transpose()?;

    let id = users
        .update(
            user_id,
            NewUser {
                first_name: &payload.first_name,
                last_name: &payload.last_name,
                email: &payload.email,
                password_hash: hashed_password.as_deref(),
                role,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "id": id })))
}

/// Deletes the caller's own account.
pub async fn delete_user(
    State(users): State<UserStore>,
    caller: Caller,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if caller.user_id != user_id {
        return Err(AppError::Forbidden("You can only delete your own account".to_string()));
    }

    let done = users.delete(user_id).await?;
    tracing::info!(user_id, "User deleted");

    Ok(Json(json!({ "success": done })))
}
