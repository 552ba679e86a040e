// src/models/test_question.rs

use serde::Serialize;
use sqlx::{FromRow, Row, postgres::PgRow};

use crate::models::question::{Question, QuestionProjection, StudentQuestion};

/// One assembly edge with its question joined in.
/// `Q` decides how much of the question is visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestQuestion<Q> {
    pub id: i64,
    pub test_id: i64,
    pub question: Q,
}

pub type TeacherTestQuestion = TestQuestion<Question>;
pub type StudentTestQuestion = TestQuestion<StudentQuestion>;

impl<'r, Q: QuestionProjection> FromRow<'r, PgRow> for TestQuestion<Q> {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            test_id: row.try_get("test_id")?,
            question: Q::from_joined_row(row)?,
        })
    }
}
