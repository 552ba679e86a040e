// src/stores/user_store.rs

use crate::{
    db::{QueryExecutor, Statement},
    error::AppError,
    models::user::{Role, User},
};

/// Persistence for accounts. Callers hand in already-hashed passwords.
#[derive(Clone)]
pub struct UserStore {
    executor: QueryExecutor,
}

pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: Role,
}

impl UserStore {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub async fn create(&self, user: NewUser<'_>) -> Result<i64, AppError> {
        let password_hash = user
            .password_hash
            .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

        let statement = Statement::new(
            r#"
            INSERT INTO users (first_name, last_name, email, password, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.email)
        .bind(password_hash)
        .bind(user.role.as_str());

        self.executor
            .write_returning_id(statement)
            .await?
            .ok_or_else(|| AppError::Storage("insert returned no id".to_string()))
    }

    /// Leaves the stored hash alone when `password_hash` is `None`.
    pub async fn update(&self, id: i64, user: NewUser<'_>) -> Result<Option<i64>, AppError> {
        let statement = match user.password_hash {
            Some(hash) => Statement::new(
                r#"
                UPDATE users
                SET first_name = $1, last_name = $2, email = $3, role = $4, password = $5
                WHERE id = $6
                RETURNING id
                "#,
            )
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.role.as_str())
            .bind(hash)
            .bind(id),
            None => Statement::new(
                r#"
                UPDATE users
                SET first_name = $1, last_name = $2, email = $3, role = $4
                WHERE id = $5
                RETURNING id
                "#,
            )
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.role.as_str())
            .bind(id),
        };

        self.executor.write_returning_id(statement).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.executor
            .execute_batch(vec![Statement::new("DELETE FROM users WHERE id = $1").bind(id)])
            .await
    }

    pub async fn fetch_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let statement = Statement::new(
            r#"
            SELECT id, first_name, last_name, email, password, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email);

        self.executor.fetch_optional(statement).await
    }
}
