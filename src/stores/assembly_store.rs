// src/stores/assembly_store.rs

use crate::{
    db::{QueryExecutor, Statement},
    error::AppError,
    models::{
        pagination::Pagination,
        test_question::{StudentTestQuestion, TeacherTestQuestion},
    },
};

/// Inserts one edge. Re-assigning an existing pair is a no-op that hands back
/// the existing edge id.
const ASSIGN_SQL: &str = r#"
    INSERT INTO test_questions (test_id, question_id)
    VALUES ($1, $2)
    ON CONFLICT (test_id, question_id) DO UPDATE SET question_id = EXCLUDED.question_id
    RETURNING id
"#;

const COUNT_SQL: &str = "SELECT COUNT(*) FROM test_questions WHERE test_id = $1";

/// The many-to-many join between tests and questions.
#[derive(Clone)]
pub struct AssemblyStore {
    executor: QueryExecutor,
}

impl AssemblyStore {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// One insert per question id, in the order given.
    pub fn assign_statements(test_id: i64, question_ids: &[i64]) -> Vec<Statement> {
        question_ids
            .iter()
            .map(|&question_id| Statement::new(ASSIGN_SQL).bind(test_id).bind(question_id))
            .collect()
    }

    /// Runs the inserts as a single all-or-nothing batch and returns the id of
    /// the last edge. An empty list writes nothing and returns 0.
    pub async fn assign_questions(&self, test_id: i64, question_ids: &[i64]) -> Result<i64, AppError> {
        tracing::info!(test_id, count = question_ids.len(), "Assigning questions to test");
        self.executor
            .write_batch_returning_id(Self::assign_statements(test_id, question_ids))
            .await
            .map_err(|e| {
                tracing::error!(test_id, "Failed to assign questions: {:?}", e);
                e
            })
    }

    pub async fn add_question(&self, test_id: i64, question_id: i64) -> Result<i64, AppError> {
        self.assign_questions(test_id, &[question_id]).await
    }

    pub async fn remove_question(&self, test_id: i64, question_id: i64) -> Result<bool, AppError> {
        tracing::info!(test_id, question_id, "Removing question from test");
        self.executor
            .execute_batch(vec![
                Statement::new("DELETE FROM test_questions WHERE test_id = $1 AND question_id = $2")
                    .bind(test_id)
                    .bind(question_id),
            ])
            .await
    }

    /// Full questions, answer keys included.
    pub async fn fetch_for_teacher(
        &self,
        test_id: i64,
        page: Pagination,
    ) -> Result<(Vec<TeacherTestQuestion>, i64), AppError> {
        tracing::info!(test_id, "Fetching questions for teacher");
        let statement = Statement::new(
            r#"
            SELECT
                tq.id,
                tq.test_id,
                q.id AS question_id,
                q.type,
                q.question_data,
                q.answer_data,
                COUNT(*) OVER() AS total
            FROM test_questions tq
            JOIN tests t ON t.id = tq.test_id
            JOIN questions q ON q.id = tq.question_id
            WHERE tq.test_id = $1
            ORDER BY tq.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(test_id);

        self.executor
            .fetch_joined_page(statement, Statement::new(COUNT_SQL).bind(test_id), page)
            .await
    }

    /// Prompts only. The answer key is neither selected nor representable.
    pub async fn fetch_for_student(
        &self,
        test_id: i64,
        page: Pagination,
    ) -> Result<(Vec<StudentTestQuestion>, i64), AppError> {
        tracing::info!(test_id, "Fetching questions for student");
        let statement = Statement::new(
            r#"
            SELECT
                tq.id,
                tq.test_id,
                q.id AS question_id,
                q.type,
                q.question_data,
                COUNT(*) OVER() AS total
            FROM test_questions tq
            JOIN tests t ON t.id = tq.test_id
            JOIN questions q ON q.id = tq.question_id
            WHERE tq.test_id = $1
            ORDER BY tq.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(test_id);

        self.executor
            .fetch_joined_page(statement, Statement::new(COUNT_SQL).bind(test_id), page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Bind;

    #[test]
    fn one_statement_per_question_in_order() {
        let statements = AssemblyStore::assign_statements(3, &[10, 11, 12]);

        assert_eq!(statements.len(), 3);
        let question_ids: Vec<&Bind> = statements.iter().map(|s| &s.args()[1]).collect();
        assert_eq!(question_ids, vec![&Bind::Int(10), &Bind::Int(11), &Bind::Int(12)]);
        assert!(statements.iter().all(|s| s.args()[0] == Bind::Int(3)));
    }

    #[test]
    fn empty_assignment_builds_nothing() {
        assert!(AssemblyStore::assign_statements(3, &[]).is_empty());
    }
}
