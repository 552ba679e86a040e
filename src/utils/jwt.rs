// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::AppError,
    models::user::{Caller, Role},
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// 'student' or 'teacher'. Older tokens may carry the numeric code.
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// Resolves the caller. `Forbidden` when the role is not one we know,
    /// `AuthError` when the subject is not a user id.
    pub fn caller(&self) -> Result<Caller, AppError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let role = Role::resolve(&self.role)
            .ok_or_else(|| AppError::Forbidden("Unknown user type".to_string()))?;

        Ok(Caller { user_id, role })
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: i64,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        role: role.as_str().to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects the
/// resolved `Caller` into the request extensions. A missing or bad token is
/// 401; a valid token whose role does not resolve is 403.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(AppError::AuthError("Missing bearer token".to_string())),
    };

    let caller = verify_jwt(token, &config.jwt_secret)?.caller()?;
    tracing::debug!(user_id = caller.user_id, role = %caller.role, "Authenticated");

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Axum Middleware: Teacher Authorization.
///
/// Must be used AFTER `auth_middleware`.
pub async fn teacher_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let caller = req
        .extensions()
        .get::<Caller>()
        .ok_or_else(|| AppError::AuthError("Not authenticated".to_string()))?;

    if caller.role != Role::Teacher {
        return Err(AppError::Forbidden("Teacher access required".to_string()));
    }

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or_else(|| AppError::AuthError("Not authenticated".to_string()))
    }
}

/// A caller that is known to be a teacher.
#[derive(Debug, Clone, Copy)]
pub struct Teacher(pub Caller);

impl<S> FromRequestParts<S> for Teacher
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        match caller.role {
            Role::Teacher => Ok(Teacher(caller)),
            Role::Student => Err(AppError::Forbidden("Teacher access required".to_string())),
        }
    }
}

/// A caller that is known to be a student.
#[derive(Debug, Clone, Copy)]
pub struct Student(pub Caller);

impl<S> FromRequestParts<S> for Student
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        match caller.role {
            Role::Student => Ok(Student(caller)),
            Role::Teacher => Err(AppError::Forbidden("Student access required".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn signed_token_resolves_to_the_same_caller() {
        let token = sign_jwt(42, Role::Teacher, SECRET, 3600).unwrap();
        let caller = verify_jwt(&token, SECRET).unwrap().caller().unwrap();

        assert_eq!(
            caller,
            Caller {
                user_id: 42,
                role: Role::Teacher
            }
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_jwt(1, Role::Student, SECRET, 3600).unwrap();
        assert!(matches!(
            verify_jwt(&token, "other-secret"),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn numeric_role_codes_resolve() {
        let claims = Claims {
            sub: "5".into(),
            role: "1".into(),
            exp: 0,
        };
        assert_eq!(claims.caller().unwrap().role, Role::Teacher);
    }

    #[test]
    fn unknown_role_is_forbidden() {
        let claims = Claims {
            sub: "5".into(),
            role: "admin".into(),
            exp: 0,
        };
        assert!(matches!(claims.caller(), Err(AppError::Forbidden(_))));
    }
}
