// src/models/submission.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Row, postgres::PgRow};

use crate::models::question::{QuestionProjection, StudentQuestion};

/// Body of a student's answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer_data: Vec<String>,
}

/// Result of an upsert on `(test_id, user_id, question_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub id: i64,
    pub answer_status: bool,
    /// `false` when an earlier submission was overwritten.
    pub created: bool,
}

impl<'r> FromRow<'r, PgRow> for SubmissionOutcome {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            answer_status: row.try_get("answer_status")?,
            created: row.try_get("inserted")?,
        })
    }
}

/// A stored submission joined with its question, as listed back to the student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: i64,
    pub test_id: i64,
    pub user_id: i64,
    pub submitted_data: Value,
    pub answer_status: bool,
    pub question: StudentQuestion,
}

impl<'r> FromRow<'r, PgRow> for Submission {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            test_id: row.try_get("test_id")?,
            user_id: row.try_get("user_id")?,
            submitted_data: row.try_get("submitted_data")?,
            answer_status: row.try_get("answer_status")?,
            question: StudentQuestion::from_joined_row(row)?,
        })
    }
}
