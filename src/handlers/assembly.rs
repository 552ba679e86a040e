// src/handlers/assembly.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    config::QUESTIONARY_SOURCE_LIMIT,
    error::AppError,
    models::{
        pagination::{Page, PageParams, Pagination},
        user::{Caller, Role},
    },
    stores::{AssemblyStore, QuestionStore, TestStore},
    utils::jwt::Teacher,
};

async fn require_test(tests: &TestStore, test_id: i64) -> Result<(), AppError> {
    tests
        .fetch_one(test_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))
}

/// Questions of a test. Teachers get the answer keys, students do not.
pub async fn list_test_questions(
    State(assembly): State<AssemblyStore>,
    caller: Caller,
    Path(test_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Response, AppError> {
    let page = Pagination::try_from(params)?;

    let response = match caller.role {
        Role::Teacher => {
            let result = assembly.fetch_for_teacher(test_id, page).await?;
            Json(Page::from(result)).into_response()
        }
        Role::Student => {
            let result = assembly.fetch_for_student(test_id, page).await?;
            Json(Page::from(result)).into_response()
        }
    };
    Ok(response)
}

/// Fills a test with the newest questions of the bank.
pub async fn generate_questionary(
    State(assembly): State<AssemblyStore>,
    State(questions): State<QuestionStore>,
    State(tests): State<TestStore>,
    _teacher: Teacher,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_test(&tests, test_id).await?;

    let question_ids = questions.fetch_latest_ids(QUESTIONARY_SOURCE_LIMIT).await?;
    if question_ids.is_empty() {
        return Err(AppError::Validation(
            "no questions to create questionary".to_string(),
        ));
    }

    let id = assembly.assign_questions(test_id, &question_ids).await?;
    tracing::info!(test_id, assigned = question_ids.len(), "Questionary generated");

    Ok(Json(json!({ "id": id, "assigned": question_ids.len() })))
}

pub async fn add_question(
    State(assembly): State<AssemblyStore>,
    State(questions): State<QuestionStore>,
    State(tests): State<TestStore>,
    _teacher: Teacher,
    Path((test_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    require_test(&tests, test_id).await?;
    if questions.fetch_one(question_id).await?.is_none() {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    let id = assembly.add_question(test_id, question_id).await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn remove_question(
    State(assembly): State<AssemblyStore>,
    _teacher: Teacher,
    Path((test_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let done = assembly.remove_question(test_id, question_id).await?;
    Ok(Json(json!({ "success": done })))
}
