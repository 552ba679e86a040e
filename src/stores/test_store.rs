// src/stores/test_store.rs

use crate::{
    config::SHORT_QUERY_TIMEOUT,
    db::{QueryExecutor, Statement},
    error::AppError,
    models::{pagination::Pagination, test::Test},
};

#[derive(Clone)]
pub struct TestStore {
    executor: QueryExecutor,
}

impl TestStore {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub async fn create(&self, title: &str) -> Result<i64, AppError> {
        tracing::info!(title, "Creating test");
        let statement =
            Statement::new("INSERT INTO tests (title) VALUES ($1) RETURNING id").bind(title);

        self.executor
            .write_returning_id(statement)
            .await?
            .ok_or_else(|| AppError::Storage("insert returned no id".to_string()))
    }

    /// `Ok(None)` when there is no such test.
    pub async fn update(&self, id: i64, title: &str) -> Result<Option<i64>, AppError> {
        tracing::info!(test_id = id, title, "Updating test");
        let statement = Statement::new("UPDATE tests SET title = $1 WHERE id = $2 RETURNING id")
            .bind(title)
            .bind(id);

        self.executor.write_returning_id(statement).await
    }

    /// Drops the test together with its assembly edges.
    /// Submissions are left untouched.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        tracing::info!(test_id = id, "Deleting test");
        self.executor
            .execute_batch(vec![
                Statement::new("DELETE FROM test_questions WHERE test_id = $1").bind(id),
                Statement::new("DELETE FROM tests WHERE id = $1").bind(id),
            ])
            .await
    }

    pub async fn fetch_one(&self, id: i64) -> Result<Option<Test>, AppError> {
        let statement =
            Statement::new("SELECT t.id, t.title FROM tests t WHERE t.id = $1 LIMIT 1").bind(id);
        self.executor.fetch_optional(statement).await
    }

    pub async fn fetch_page(&self, page: Pagination) -> Result<(Vec<Test>, i64), AppError> {
        let statement = Statement::new(
            r#"
            SELECT
                t.id,
                t.title,
                COUNT(*) OVER() AS total
            FROM tests t
            ORDER BY t.id DESC
            LIMIT $1 OFFSET $2
            "#,
        );
        let count = Statement::new("SELECT COUNT(*) FROM tests");

        self.executor
            .fetch_page(statement, count, page, SHORT_QUERY_TIMEOUT)
            .await
    }
}
