// src/stores/submission_store.rs

use std::collections::HashSet;

use sqlx::{FromRow, Row};

use crate::{
    config::SHORT_QUERY_TIMEOUT,
    db::{AccessMode, QueryExecutor, Statement},
    error::AppError,
    models::{
        pagination::Pagination,
        question::AnswerKey,
        submission::{Submission, SubmissionOutcome, SubmitAnswerRequest},
    },
};

/// Overlap-count grading.
///
/// A submission is correct when every choice in the key was submitted. Both
/// sides are treated as sets, so duplicates never count twice, and extra
/// choices outside the key are not penalized: key `{A, C}` accepts `{A, C, D}`.
pub fn grade(submitted: &[String], key: &AnswerKey) -> bool {
    let correct: HashSet<&str> = key.choices.iter().map(String::as_str).collect();
    let given: HashSet<&str> = submitted.iter().map(String::as_str).collect();

    let matched = given.iter().filter(|choice| correct.contains(*choice)).count();
    matched == correct.len()
}

/// Intake and grading of student answers.
#[derive(Clone)]
pub struct SubmissionStore {
    executor: QueryExecutor,
}

impl SubmissionStore {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    /// Grades `answer` against the question's key and stores it under
    /// `(test_id, user_id, question_id)`, overwriting an earlier submission.
    ///
    /// Key lookup, grading and the write share one transaction. A question
    /// that is missing or not assigned to the test, or an unreadable key,
    /// aborts before anything is written.
    pub async fn submit_or_update(
        &self,
        test_id: i64,
        user_id: i64,
        question_id: i64,
        answer: &SubmitAnswerRequest,
    ) -> Result<SubmissionOutcome, AppError> {
        tracing::info!(test_id, user_id, question_id, "Submitting answer");

        let submitted_data = serde_json::to_value(answer)?;
        let choices = answer.answer_data.clone();

        let outcome = self
            .executor
            .transaction(AccessMode::ReadWrite, SHORT_QUERY_TIMEOUT, move |tx| {
                Box::pin(async move {
                    let key_row = Statement::new(
                        r#"
                        SELECT q.answer_data
                        FROM test_questions tq
                        JOIN questions q ON q.id = tq.question_id
                        WHERE tq.test_id = $1 AND tq.question_id = $2
                        "#,
                    )
                    .bind(test_id)
                    .bind(question_id)
                    .query()
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Question not found in test".to_string()))?;

                    let key_data: serde_json::Value = key_row.try_get("answer_data")?;
                    let key: AnswerKey = serde_json::from_value(key_data)?;

                    let answer_status = grade(&choices, &key);
                    tracing::debug!(
                        question_id,
                        ?choices,
                        correct = ?key.choices,
                        answer_status,
                        "Graded submission"
                    );

                    let row = Statement::new(
                        r#"
                        INSERT INTO test_question_submissions
                            (test_id, user_id, question_id, submitted_data, answer_status)
                        VALUES ($1, $2, $3, $4, $5)
                        ON CONFLICT (test_id, user_id, question_id) DO UPDATE SET
                            submitted_data = EXCLUDED.submitted_data,
                            answer_status = EXCLUDED.answer_status
                        RETURNING id, answer_status, (xmax = 0) AS inserted
                        "#,
                    )
                    .bind(test_id)
                    .bind(user_id)
                    .bind(question_id)
                    .bind(submitted_data)
                    .bind(answer_status)
                    .query()
                    .fetch_one(&mut **tx)
                    .await?;

                    Ok(SubmissionOutcome::from_row(&row)?)
                })
            })
            .await
            .map_err(|e| {
                tracing::error!(test_id, user_id, question_id, "Failed to submit answer: {:?}", e);
                e
            })?;

        Ok(outcome)
    }

    /// The caller's own submissions for a test, newest first.
    pub async fn fetch_submissions(
        &self,
        test_id: i64,
        user_id: i64,
        page: Pagination,
    ) -> Result<(Vec<Submission>, i64), AppError> {
        tracing::info!(test_id, user_id, "Fetching submissions");
        let statement = Statement::new(
            r#"
            SELECT
                s.id,
                s.test_id,
                s.user_id,
                s.submitted_data,
                s.answer_status,
                q.id AS question_id,
                q.type,
                q.question_data,
                COUNT(*) OVER() AS total
            FROM test_question_submissions s
            JOIN questions q ON q.id = s.question_id
            WHERE s.test_id = $1 AND s.user_id = $2
            ORDER BY s.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(test_id)
        .bind(user_id);
        let count = Statement::new(
            r#"
            SELECT COUNT(*)
            FROM test_question_submissions s
            JOIN questions q ON q.id = s.question_id
            WHERE s.test_id = $1 AND s.user_id = $2
            "#,
        )
        .bind(test_id)
        .bind(user_id);

        self.executor.fetch_joined_page(statement, count, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(choices: &[&str]) -> AnswerKey {
        AnswerKey {
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn submitted(choices: &[&str]) -> Vec<String> {
        choices.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn exact_match_is_correct() {
        assert!(grade(&submitted(&["A", "C"]), &key(&["A", "C"])));
        assert!(grade(&submitted(&["C", "A"]), &key(&["A", "C"])));
    }

    #[test]
    fn missing_a_correct_choice_is_wrong() {
        assert!(!grade(&submitted(&["A"]), &key(&["A", "C"])));
        assert!(!grade(&submitted(&[]), &key(&["A", "C"])));
    }

    #[test]
    fn extra_wrong_choices_do_not_flip_the_status() {
        // Overlap-count rule: superset of the key still passes.
        assert!(grade(&submitted(&["A", "C", "D"]), &key(&["A", "C"])));
    }

    #[test]
    fn duplicate_submissions_count_once() {
        assert!(!grade(&submitted(&["A", "A"]), &key(&["A", "C"])));
        assert!(grade(&submitted(&["A", "A", "C"]), &key(&["A", "C"])));
    }

    #[test]
    fn true_or_false_keys_grade_the_same_way() {
        assert!(grade(&submitted(&["true"]), &key(&["true"])));
        assert!(!grade(&submitted(&["false"]), &key(&["true"])));
    }

    #[test]
    fn grading_is_deterministic() {
        let answer = submitted(&["4", "5"]);
        let k = key(&["4"]);
        assert_eq!(grade(&answer, &k), grade(&answer, &k));
    }
}
