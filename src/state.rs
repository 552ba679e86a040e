// src/state.rs

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    config::Config,
    db::QueryExecutor,
    stores::{AssemblyStore, QuestionStore, SubmissionStore, TestStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: UserStore,
    pub questions: QuestionStore,
    pub tests: TestStore,
    pub assembly: AssemblyStore,
    pub submissions: SubmissionStore,
}

impl AppState {
    /// Every store shares one executor over the same pool.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let executor = QueryExecutor::new(pool);
        Self {
            config,
            users: UserStore::new(executor.clone()),
            questions: QuestionStore::new(executor.clone()),
            tests: TestStore::new(executor.clone()),
            assembly: AssemblyStore::new(executor.clone()),
            submissions: SubmissionStore::new(executor),
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for UserStore {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for QuestionStore {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}

impl FromRef<AppState> for TestStore {
    fn from_ref(state: &AppState) -> Self {
        state.tests.clone()
    }
}

impl FromRef<AppState> for AssemblyStore {
    fn from_ref(state: &AppState) -> Self {
        state.assembly.clone()
    }
}

impl FromRef<AppState> for SubmissionStore {
    fn from_ref(state: &AppState) -> Self {
        state.submissions.clone()
    }
}
