// src/handlers/tests.rs

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
        test::NewTest,
        user::Caller,
    },
    stores::TestStore,
    utils::{html::clean_html, jwt::Teacher},
};

/// Sanitized title; a title that is nothing but markup is rejected.
fn clean_title(payload: &NewTest) -> Result<String, AppError> {
    payload.validate()?;
    let title = clean_html(payload.title.trim());
    if title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    Ok(title)
}

pub async fn list_tests(
    State(tests): State<TestStore>,
    _caller: Caller,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = Pagination::try_from(params)?;
    let result = tests.fetch_page(page).await?;
    Ok(Json(Page::from(result)))
}

pub async fn get_test(
    State(tests): State<TestStore>,
    _caller: Caller,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = tests
        .fetch_one(test_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;
    Ok(Json(test))
}

pub async fn create_test(
    State(tests): State<TestStore>,
    Teacher(caller): Teacher,
    Json(payload): Json<NewTest>,
) -> Result<impl IntoResponse, AppError> {
    let title = clean_title(&payload)?;
    let id = tests.create(&title).await?;
    tracing::info!(test_id = id, user_id = caller.user_id, "Test created");
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_test(
    State(tests): State<TestStore>,
    _teacher: Teacher,
    Path(test_id): Path<i64>,
    Json(payload): Json<NewTest>,
) -> Result<impl IntoResponse, AppError> {
    let title = clean_title(&payload)?;
    let id = tests
        .update(test_id, &title)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;
    Ok(Json(json!({ "id": id })))
}

pub async fn delete_test(
    State(tests): State<TestStore>,
    _teacher: Teacher,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let done = tests.delete(test_id).await?;
    Ok(Json(json!({ "success": done })))
}
