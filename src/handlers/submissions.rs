// src/handlers/submissions.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        pagination::{Page, PageParams, Pagination},
        submission::SubmitAnswerRequest,
        user::Caller,
    },
    stores::SubmissionStore,
    utils::jwt::Student,
};

/// Grades and stores the student's answer. Resubmitting overwrites.
pub async fn submit_answer(
    State(submissions): State<SubmissionStore>,
    Student(caller): Student,
    Path((test_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = submissions
        .submit_or_update(test_id, caller.user_id, question_id, &payload)
        .await?;
    Ok(Json(outcome))
}

/// The caller's own submissions for a test.
pub async fn list_submissions(
    State(submissions): State<SubmissionStore>,
    caller: Caller,
    Path(test_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = Pagination::try_from(params)?;
    let result = submissions
        .fetch_submissions(test_id, caller.user_id, page)
        .await?;
    Ok(Json(Page::from(result)))
}
