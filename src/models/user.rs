// src/models/user.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use validator::Validate;

/// Who is calling. Gates which projections and mutations are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Student, Role::Teacher];

    /// Numeric code used by older clients: 0 = student, 1 = teacher.
    pub fn code(self) -> i32 {
        match self {
            Role::Student => 0,
            Role::Teacher => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Role::Student),
            1 => Some(Role::Teacher),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }

    /// Accepts either the name or the numeric code.
    pub fn resolve(raw: &str) -> Option<Self> {
        Role::parse(raw).or_else(|| raw.parse::<i32>().ok().and_then(Role::from_code))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub role: Role,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let raw_role: String = row.try_get("role")?;
        let role = Role::parse(&raw_role)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown role '{}'", raw_role).into()))?;

        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// DTO for registering a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    /// 'student' or 'teacher'.
    #[serde(rename = "type")]
    pub role: String,
}

/// DTO for updating a user. The password is only replaced when present.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub role: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
