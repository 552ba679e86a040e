// src/routes.rs

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{assembly, auth, health, questions, submissions, tests},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Open routes: health, registration, login.
/// * Everything else requires a bearer token; the question bank is
///   additionally teacher-only.
/// * Global middleware: request id, trace, CORS.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/user", post(auth::register))
        .route("/token", post(auth::login));

    let question_routes = Router::new()
        .route("/questions", get(questions::list_questions))
        .route("/question", post(questions::create_question))
        .route(
            "/question/{question_id}",
            get(questions::get_question)
                .put(questions::update_question)
                .delete(questions::delete_question),
        )
        // Auth first, then the teacher check
        .route_layer(middleware::from_fn(teacher_middleware));

    let protected_routes = Router::new()
        .route(
            "/user/{user_id}",
            put(auth::update_user).delete(auth::delete_user),
        )
        .route("/tests", get(tests::list_tests))
        .route("/test", post(tests::create_test))
        .route(
            "/test/{test_id}",
            get(tests::get_test)
                .put(tests::update_test)
                .delete(tests::delete_test),
        )
        .route("/test/{test_id}/questions", get(assembly::list_test_questions))
        .route(
            "/test/{test_id}/generate_questionary",
            post(assembly::generate_questionary),
        )
        .route(
            "/test/{test_id}/question/{question_id}/add_question",
            put(assembly::add_question),
        )
        .route(
            "/test/{test_id}/question/{question_id}",
            put(submissions::submit_answer).delete(assembly::remove_question),
        )
        .route(
            "/test/{test_id}/submissions",
            get(submissions::list_submissions),
        )
        .merge(question_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // ServiceBuilder runs top to bottom: the id is set before the span opens
    let request_layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .extensions()
                    .get::<RequestId>()
                    .and_then(|id| id.header_value().to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(request_layers)
        .layer(cors)
        .with_state(state)
}
