// tests/store_tests.rs

mod common;

use std::time::Duration;

use assessment_backend::{
    db::AccessMode,
    error::AppError,
    models::{pagination::Pagination, question::NewQuestion, submission::SubmitAnswerRequest},
    stores::{AssemblyStore, QuestionStore, SubmissionStore, TestStore},
};
use serde_json::json;

struct Stores {
    executor: assessment_backend::db::QueryExecutor,
    questions: QuestionStore,
    tests: TestStore,
    assembly: AssemblyStore,
    submissions: SubmissionStore,
    pool: sqlx::PgPool,
}

async fn stores() -> Option<Stores> {
    let executor = common::test_executor().await?;
    Some(Stores {
        executor: executor.clone(),
        questions: QuestionStore::new(executor.clone()),
        tests: TestStore::new(executor.clone()),
        assembly: AssemblyStore::new(executor.clone()),
        submissions: SubmissionStore::new(executor.clone()),
        pool: executor.pool().clone(),
    })
}

fn multiple_choice(prompt: &str, correct: &[&str]) -> NewQuestion {
    NewQuestion {
        question_type: "multiple_choice".to_string(),
        question_data: json!({ "prompt": prompt, "options": ["A", "B", "C", "D"] }),
        answer_data: json!({ "choices": correct }),
    }
}

fn answer(choices: &[&str]) -> SubmitAnswerRequest {
    SubmitAnswerRequest {
        answer_data: choices.iter().map(|c| c.to_string()).collect(),
    }
}

async fn edge_count(pool: &sqlx::PgPool, test_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM test_questions WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn assembled_test_projects_by_role_and_cleans_up_on_delete() {
    let Some(s) = stores().await else { return };

    let q = s.questions.create(&multiple_choice("2+2?", &["4"])).await.unwrap();
    let t = s.tests.create("Arithmetic").await.unwrap();
    s.assembly.assign_questions(t, &[q]).await.unwrap();

    let (teacher_view, total) = s
        .assembly
        .fetch_for_teacher(t, Pagination::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(teacher_view[0].question.id, q);
    assert_eq!(teacher_view[0].question.answer_data, json!({ "choices": ["4"] }));

    let (student_view, total) = s
        .assembly
        .fetch_for_student(t, Pagination::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    let body = serde_json::to_value(&student_view[0]).unwrap();
    assert!(body["question"].get("answer_data").is_none());
    assert_eq!(body["question"]["question_data"]["prompt"], "2+2?");

    assert!(s.questions.delete(q).await.unwrap());
    assert_eq!(s.questions.fetch_one(q).await.unwrap(), None);
    assert_eq!(edge_count(&s.pool, t).await, 0);

    assert!(s.tests.delete(t).await.unwrap());
    assert_eq!(s.tests.fetch_one(t).await.unwrap(), None);
}

#[tokio::test]
async fn resubmitting_overwrites_the_single_row() {
    let Some(s) = stores().await else { return };
    let user_id = common::unique_id();

    let q = s.questions.create(&multiple_choice("Pick A and C", &["A", "C"])).await.unwrap();
    let t = s.tests.create("Upsert").await.unwrap();
    s.assembly.add_question(t, q).await.unwrap();

    let first = s
        .submissions
        .submit_or_update(t, user_id, q, &answer(&["A"]))
        .await
        .unwrap();
    assert!(first.created);
    assert!(!first.answer_status);

    let second = s
        .submissions
        .submit_or_update(t, user_id, q, &answer(&["C", "A"]))
        .await
        .unwrap();
    assert!(!second.created);
    assert!(second.answer_status);
    assert_eq!(first.id, second.id);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM test_question_submissions WHERE test_id = $1 AND user_id = $2",
    )
    .bind(t)
    .bind(user_id)
    .fetch_one(&s.pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);

    let (listed, total) = s
        .submissions
        .fetch_submissions(t, user_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(listed[0].submitted_data, json!({ "answer_data": ["C", "A"] }));
    assert!(listed[0].answer_status);
    assert_eq!(listed[0].question.id, q);
}

#[tokio::test]
async fn superset_answers_are_graded_correct() {
    let Some(s) = stores().await else { return };
    let user_id = common::unique_id();

    let q = s.questions.create(&multiple_choice("A and C", &["A", "C"])).await.unwrap();
    let t = s.tests.create("Grading").await.unwrap();
    s.assembly.add_question(t, q).await.unwrap();

    let outcome = s
        .submissions
        .submit_or_update(t, user_id, q, &answer(&["A", "C", "D"]))
        .await
        .unwrap();
    assert!(outcome.answer_status);
}

#[tokio::test]
async fn submitting_to_a_missing_question_writes_nothing() {
    let Some(s) = stores().await else { return };
    let user_id = common::unique_id();
    let t = s.tests.create("Missing question").await.unwrap();

    let err = s
        .submissions
        .submit_or_update(t, user_id, i64::MAX, &answer(&["A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let (listed, total) = s
        .submissions
        .fetch_submissions(t, user_id, Pagination::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn bulk_assign_is_all_or_nothing() {
    let Some(s) = stores().await else { return };

    let q = s.questions.create(&multiple_choice("valid", &["A"])).await.unwrap();
    let t = s.tests.create("Atomic").await.unwrap();

    let result = s.assembly.assign_questions(t, &[q, i64::MAX]).await;
    assert!(result.is_err());
    assert_eq!(edge_count(&s.pool, t).await, 0);
}

#[tokio::test]
async fn reassigning_a_pair_keeps_one_edge() {
    let Some(s) = stores().await else { return };

    let q = s.questions.create(&multiple_choice("twice", &["B"])).await.unwrap();
    let t = s.tests.create("Idempotent assign").await.unwrap();

    let first = s.assembly.add_question(t, q).await.unwrap();
    let second = s.assembly.add_question(t, q).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(edge_count(&s.pool, t).await, 1);

    assert!(s.assembly.remove_question(t, q).await.unwrap());
    assert_eq!(edge_count(&s.pool, t).await, 0);
}

#[tokio::test]
async fn past_the_end_page_keeps_the_total() {
    let Some(s) = stores().await else { return };
    let t = s.tests.create("Paging").await.unwrap();

    let mut ids = Vec::new();
    for i in 0..3 {
        let prompt = format!("q{}", i);
        ids.push(s.questions.create(&multiple_choice(&prompt, &["A"])).await.unwrap());
    }
    s.assembly.assign_questions(t, &ids).await.unwrap();

    let (first_page, total) = s
        .assembly
        .fetch_for_student(t, Pagination::new(Some(2), Some(0)).unwrap())
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(total, 3);

    let (past_end, total) = s
        .assembly
        .fetch_for_student(t, Pagination::new(Some(2), Some(10)).unwrap())
        .await
        .unwrap();
    assert!(past_end.is_empty());
    assert_eq!(total, 3);
}

#[tokio::test]
async fn updating_a_missing_row_reports_none() {
    let Some(s) = stores().await else { return };

    assert_eq!(s.tests.update(i64::MAX, "Nope").await.unwrap(), None);
    assert_eq!(
        s.questions
            .update(i64::MAX, &multiple_choice("nope", &["A"]))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn unknown_question_type_never_reaches_the_database() {
    let Some(s) = stores().await else { return };

    let mut payload = multiple_choice("essay?", &["A"]);
    payload.question_type = "essay".to_string();

    let err = s.questions.create(&payload).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn submitting_to_a_question_outside_the_test_writes_nothing() {
    let Some(s) = stores().await else { return };
    let user_id = common::unique_id();

    let q = s.questions.create(&multiple_choice("elsewhere", &["A"])).await.unwrap();
    let t = s.tests.create("Not assigned").await.unwrap();

    let err = s
        .submissions
        .submit_or_update(t, user_id, q, &answer(&["A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let (listed, total) = s
        .submissions
        .fetch_submissions(t, user_id, Pagination::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn timed_out_transaction_leaves_no_rows_behind() {
    let Some(s) = stores().await else { return };
    let title = format!("slow {}", common::unique_id());

    let insert_title = title.clone();
    let result = s
        .executor
        .transaction(AccessMode::ReadWrite, Duration::from_millis(300), move |tx| {
            Box::pin(async move {
                sqlx::query("INSERT INTO tests (title) VALUES ($1)")
                    .bind(insert_title)
                    .execute(&mut **tx)
                    .await?;
                sqlx::query("SELECT pg_sleep(2)").execute(&mut **tx).await?;
                Ok(())
            })
        })
        .await;

    match result {
        Err(AppError::Timeout(msg)) => assert!(msg.contains("300ms"), "{}", msg),
        other => panic!("expected a timeout, got {:?}", other),
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tests WHERE title = $1")
        .bind(&title)
        .fetch_one(&s.pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
