// src/stores/question_store.rs

use crate::{
    config::SHORT_QUERY_TIMEOUT,
    db::{QueryExecutor, Statement},
    error::AppError,
    models::{
        pagination::Pagination,
        question::{NewQuestion, Question},
    },
};

/// CRUD over the question bank.
#[derive(Clone)]
pub struct QuestionStore {
    executor: QueryExecutor,
}

impl QuestionStore {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Inserts a question. Type and answer key are checked first; a bad one
    /// never opens a transaction.
    pub async fn create(&self, payload: &NewQuestion) -> Result<i64, AppError> {
        let question_type = payload.check()?;
        tracing::info!(%question_type, "Creating question");

        let statement = Statement::new(
            r#"
            INSERT INTO questions (type, question_data, answer_data)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(question_type.as_str())
        .bind(payload.question_data.clone())
        .bind(payload.answer_data.clone());

        self.executor
            .write_returning_id(statement)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create question: {:?}", e);
                e
            })?
            .ok_or_else(|| AppError::Storage("insert returned no id".to_string()))
    }

    /// Replaces a question in place. `Ok(None)` when the id does not exist.
    pub async fn update(&self, id: i64, payload: &NewQuestion) -> Result<Option<i64>, AppError> {
        let question_type = payload.check()?;
        tracing::info!(question_id = id, %question_type, "Updating question");

        let statement = Statement::new(
            r#"
            UPDATE questions
            SET type = $1, question_data = $2, answer_data = $3
            WHERE id = $4
            RETURNING id
            "#,
        )
        .bind(question_type.as_str())
        .bind(payload.question_data.clone())
        .bind(payload.answer_data.clone())
        .bind(id);

        self.executor.write_returning_id(statement).await
    }

    /// Removes the question and every assembly edge pointing at it, atomically.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        tracing::info!(question_id = id, "Deleting question");
        self.executor
            .execute_batch(vec![
                Statement::new("DELETE FROM test_questions WHERE question_id = $1").bind(id),
                Statement::new("DELETE FROM questions WHERE id = $1").bind(id),
            ])
            .await
    }

    pub async fn fetch_one(&self, id: i64) -> Result<Option<Question>, AppError> {
        let statement = Statement::new(
            r#"
            SELECT id, type, question_data, answer_data
            FROM questions
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id);

        let question = self.executor.fetch_optional(statement).await?;
        if question.is_none() {
            tracing::info!(question_id = id, "No question found");
        }
        Ok(question)
    }

    /// Newest first, with the total bank size.
    pub async fn fetch_page(&self, page: Pagination) -> Result<(Vec<Question>, i64), AppError> {
        let statement = Statement::new(
            r#"
            SELECT
                id,
                type,
                question_data,
                answer_data,
                COUNT(*) OVER() AS total
            FROM questions
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        );
        let count = Statement::new("SELECT COUNT(*) FROM questions");

        self.executor
            .fetch_page(statement, count, page, SHORT_QUERY_TIMEOUT)
            .await
    }

    /// Ids of the newest `limit` questions.
    pub async fn fetch_latest_ids(&self, limit: i64) -> Result<Vec<i64>, AppError> {
        let statement =
            Statement::new("SELECT id FROM questions ORDER BY id DESC LIMIT $1").bind(limit);
        let rows: Vec<(i64,)> = self.executor.fetch_all(statement).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
