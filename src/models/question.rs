// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Row, postgres::PgRow};
use validator::Validate;

use crate::error::AppError;

/// The two kinds of question the bank accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    TrueOrFalse,
    MultipleChoice,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::TrueOrFalse, QuestionType::MultipleChoice];

    /// Numeric code used by older clients: 0 = true/false, 1 = multiple choice.
    pub fn code(self) -> i32 {
        match self {
            QuestionType::TrueOrFalse => 0,
            QuestionType::MultipleChoice => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(QuestionType::TrueOrFalse),
            1 => Some(QuestionType::MultipleChoice),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::TrueOrFalse => "true_or_false",
            QuestionType::MultipleChoice => "multiple_choice",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "true_or_false" => Some(QuestionType::TrueOrFalse),
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn read_type(row: &PgRow) -> Result<QuestionType, sqlx::Error> {
    let raw: String = row.try_get("type")?;
    QuestionType::parse(&raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown question type '{}'", raw).into()))
}

/// Stored answer key. Only `choices` takes part in grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub choices: Vec<String>,
}

/// Represents the 'questions' table, answer key included.
/// Only ever handed to teachers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question_data: Value,
    pub answer_data: Value,
}

/// A question as a student sees it: the answer key is not part of the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question_data: Value,
}

impl<'r> FromRow<'r, PgRow> for Question {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            question_type: read_type(row)?,
            question_data: row.try_get("question_data")?,
            answer_data: row.try_get("answer_data")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StudentQuestion {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            question_type: read_type(row)?,
            question_data: row.try_get("question_data")?,
        })
    }
}

/// Decoding of a question embedded in a joined row, where the question id
/// arrives as `question_id`.
pub trait QuestionProjection: Sized {
    fn from_joined_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl QuestionProjection for Question {
    fn from_joined_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("question_id")?,
            question_type: read_type(row)?,
            question_data: row.try_get("question_data")?,
            answer_data: row.try_get("answer_data")?,
        })
    }
}

impl QuestionProjection for StudentQuestion {
    fn from_joined_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("question_id")?,
            question_type: read_type(row)?,
            question_data: row.try_get("question_data")?,
        })
    }
}

/// DTO for creating or replacing a question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuestion {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub question_type: String,
    pub question_data: Value,
    pub answer_data: Value,
}

impl NewQuestion {
    /// Checks type and answer key shape before anything touches the database.
    pub fn check(&self) -> Result<QuestionType, AppError> {
        let question_type = QuestionType::parse(&self.question_type).ok_or_else(|| {
            AppError::Validation(format!("unrecognized question type '{}'", self.question_type))
        })?;

        let key: AnswerKey = serde_json::from_value(self.answer_data.clone()).map_err(|_| {
            AppError::Validation("answer_data must be an object with a 'choices' list".to_string())
        })?;
        if key.choices.is_empty() {
            return Err(AppError::Validation(
                "answer_data.choices cannot be empty".to_string(),
            ));
        }

        Ok(question_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_codes_round_trip() {
        for t in QuestionType::ALL {
            assert_eq!(QuestionType::from_code(t.code()), Some(t));
            assert_eq!(QuestionType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn unknown_types_yield_nothing() {
        assert_eq!(QuestionType::from_code(2), None);
        assert_eq!(QuestionType::from_code(-1), None);
        assert_eq!(QuestionType::parse("essay"), None);
        assert_eq!(QuestionType::parse(""), None);
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let t: QuestionType = serde_json::from_value(json!("multiple_choice")).unwrap();
        assert_eq!(t, QuestionType::MultipleChoice);
        assert_eq!(
            serde_json::to_value(QuestionType::TrueOrFalse).unwrap(),
            json!("true_or_false")
        );
    }

    fn new_question(kind: &str, answer: Value) -> NewQuestion {
        NewQuestion {
            question_type: kind.to_string(),
            question_data: json!({"prompt": "2+2?"}),
            answer_data: answer,
        }
    }

    #[test]
    fn check_accepts_a_well_formed_question() {
        let q = new_question("multiple_choice", json!({"choices": ["4"]}));
        assert_eq!(q.check().unwrap(), QuestionType::MultipleChoice);
    }

    #[test]
    fn check_rejects_unknown_type() {
        let q = new_question("essay", json!({"choices": ["4"]}));
        assert!(matches!(q.check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn check_rejects_answer_without_choices() {
        let q = new_question("true_or_false", json!({"answer": true}));
        assert!(matches!(q.check(), Err(AppError::Validation(_))));

        let q = new_question("true_or_false", json!({"choices": []}));
        assert!(matches!(q.check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn student_projection_has_no_answer_key() {
        let q = StudentQuestion {
            id: 1,
            question_type: QuestionType::MultipleChoice,
            question_data: json!({"prompt": "2+2?"}),
        };
        let body = serde_json::to_value(q).unwrap();
        assert!(body.get("answer_data").is_none());
        assert_eq!(body["type"], "multiple_choice");
    }
}
