// src/handlers/questions.rs

//! Question bank. Every route here sits behind `teacher_middleware`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        pagination::{Page, PageParams, Pagination},
        question::NewQuestion,
    },
    stores::QuestionStore,
};

pub async fn list_questions(
    State(questions): State<QuestionStore>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = Pagination::try_from(params)?;
    let result = questions.fetch_page(page).await?;
    Ok(Json(Page::from(result)))
}

pub async fn get_question(
    State(questions): State<QuestionStore>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = questions
        .fetch_one(question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(question))
}

pub async fn create_question(
    State(questions): State<QuestionStore>,
    Json(payload): Json<NewQuestion>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let id = questions.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_question(
    State(questions): State<QuestionStore>,
    Path(question_id): Path<i64>,
    Json(payload): Json<NewQuestion>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let id = questions
        .update(question_id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(json!({ "id": id })))
}

/// Also drops the question from every test it was assigned to.
pub async fn delete_question(
    State(questions): State<QuestionStore>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let done = questions.delete(question_id).await?;
    Ok(Json(json!({ "success": done })))
}
