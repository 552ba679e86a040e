// src/db/executor.rs

//! Scoped transactions over the shared pool.
//!
//! Every store goes through [`QueryExecutor`]: a transaction is opened with a
//! declared access mode, the statement (or batch) runs inside it, and the
//! transaction commits on success or rolls back on any error. The whole unit
//! is bounded by a timeout; when it elapses the transaction is dropped before
//! commit, so nothing it wrote survives.

use std::{future::Future, pin::Pin, time::Duration};

use serde_json::Value;
use sqlx::{
    FromRow, PgConnection, PgPool, Postgres, Row, Transaction,
    postgres::{PgArguments, PgRow},
    query::Query,
    types::Json,
};

use crate::{
    config::{LONG_QUERY_TIMEOUT, SHORT_QUERY_TIMEOUT},
    error::AppError,
    models::pagination::Pagination,
};

pub type PgTransaction = Transaction<'static, Postgres>;

/// Boxed future returned by a transaction body.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 't>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// A positional argument for a [`Statement`].
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Int(i64),
    Text(String),
    Bool(bool),
    Json(Value),
}

impl From<i64> for Bind {
    fn from(v: i64) -> Self {
        Bind::Int(v)
    }
}

impl From<String> for Bind {
    fn from(v: String) -> Self {
        Bind::Text(v)
    }
}

impl From<&str> for Bind {
    fn from(v: &str) -> Self {
        Bind::Text(v.to_owned())
    }
}

impl From<bool> for Bind {
    fn from(v: bool) -> Self {
        Bind::Bool(v)
    }
}

impl From<Value> for Bind {
    fn from(v: Value) -> Self {
        Bind::Json(v)
    }
}

/// One parameterized SQL statement. Caller values only ever travel as binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: &'static str,
    args: Vec<Bind>,
}

impl Statement {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            args: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Bind>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn args(&self) -> &[Bind] {
        &self.args
    }

    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(self.sql);
        for arg in &self.args {
            query = match arg {
                Bind::Int(v) => query.bind(*v),
                Bind::Text(v) => query.bind(v.as_str()),
                Bind::Bool(v) => query.bind(*v),
                Bind::Json(v) => query.bind(Json(v)),
            };
        }
        query
    }

    /// Runs the statement and reads the first column of the first row as an id.
    /// `None` when the statement touched no row.
    pub async fn fetch_id(&self, conn: &mut PgConnection) -> Result<Option<i64>, AppError> {
        let row = self.query().fetch_optional(conn).await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<i64, _>(0)?)),
            None => Ok(None),
        }
    }
}

#[derive(Clone)]
pub struct QueryExecutor {
    pool: PgPool,
}

impl QueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `op` inside one transaction: commit on `Ok`, rollback on `Err`,
    /// rollback-on-drop when `timeout` elapses first.
    pub async fn transaction<T, F>(
        &self,
        mode: AccessMode,
        timeout: Duration,
        op: F,
    ) -> Result<T, AppError>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut PgTransaction) -> TxFuture<'t, T> + Send,
    {
        let work = async {
            let mut tx = self.pool.begin().await.map_err(|e| {
                tracing::error!("Failed to begin transaction: {:?}", e);
                AppError::from(e)
            })?;

            if mode == AccessMode::ReadOnly {
                sqlx::query("SET TRANSACTION READ ONLY")
                    .execute(&mut *tx)
                    .await?;
            }

            match op(&mut tx).await {
                Ok(value) => {
                    tx.commit().await?;
                    Ok(value)
                }
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::error!("Failed to roll back transaction: {:?}", rollback_err);
                    }
                    Err(e)
                }
            }
        };

        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Transaction exceeded {:?}, rolled back", timeout);
                Err(AppError::Timeout(format!(
                    "transaction exceeded {:?}",
                    timeout
                )))
            }
        }
    }

    /// Single write that returns a generated (or matched) identifier.
    /// `Ok(None)` means the statement matched no row, e.g. an update of a missing id.
    pub async fn write_returning_id(&self, statement: Statement) -> Result<Option<i64>, AppError> {
        tracing::debug!(sql = statement.sql(), args = ?statement.args(), "write");
        self.transaction(AccessMode::ReadWrite, SHORT_QUERY_TIMEOUT, move |tx| {
            Box::pin(async move { statement.fetch_id(&mut **tx).await })
        })
        .await
    }

    /// Runs every statement in order inside one transaction and returns the id
    /// produced by the last one. Any failure rolls the whole batch back.
    /// An empty batch touches nothing and returns 0.
    pub async fn write_batch_returning_id(&self, statements: Vec<Statement>) -> Result<i64, AppError> {
        if statements.is_empty() {
            return Ok(0);
        }
        tracing::debug!(count = statements.len(), "batch write");
        self.transaction(AccessMode::ReadWrite, SHORT_QUERY_TIMEOUT, move |tx| {
            Box::pin(async move {
                let mut last_id = 0;
                for statement in &statements {
                    last_id = statement.fetch_id(&mut **tx).await?.ok_or_else(|| {
                        AppError::Storage(format!("statement returned no id: {}", statement.sql()))
                    })?;
                }
                Ok(last_id)
            })
        })
        .await
    }

    /// Runs statements that return nothing (deletes). Completion flag only.
    pub async fn execute_batch(&self, statements: Vec<Statement>) -> Result<bool, AppError> {
        if statements.is_empty() {
            return Ok(true);
        }
        self.transaction(AccessMode::ReadWrite, SHORT_QUERY_TIMEOUT, move |tx| {
            Box::pin(async move {
                for statement in &statements {
                    let result = statement.query().execute(&mut **tx).await?;
                    tracing::debug!(
                        sql = statement.sql(),
                        rows = result.rows_affected(),
                        "executed"
                    );
                }
                Ok(true)
            })
        })
        .await
    }

    /// Read-only single-row lookup; no rows is `Ok(None)`, not an error.
    pub async fn fetch_optional<T>(&self, statement: Statement) -> Result<Option<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send,
    {
        self.transaction(AccessMode::ReadOnly, SHORT_QUERY_TIMEOUT, move |tx| {
            Box::pin(async move {
                let row = statement.query().fetch_optional(&mut **tx).await?;
                match row {
                    Some(row) => Ok(Some(T::from_row(&row)?)),
                    None => Ok(None),
                }
            })
        })
        .await
    }

    /// Read-only multi-row fetch without paging.
    pub async fn fetch_all<T>(&self, statement: Statement) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send,
    {
        self.transaction(AccessMode::ReadOnly, SHORT_QUERY_TIMEOUT, move |tx| {
            Box::pin(async move {
                let rows = statement.query().fetch_all(&mut **tx).await?;
                let items = rows
                    .iter()
                    .map(|row| T::from_row(row))
                    .collect::<Result<Vec<T>, sqlx::Error>>()?;
                Ok(items)
            })
        })
        .await
    }

    /// Fetches one page plus the total row count.
    ///
    /// `page` must select a `total` column computed with `COUNT(*) OVER()` and
    /// end in `LIMIT $n OFFSET $n+1`; the window's limit and offset are bound
    /// here, after the caller's own binds. If the page is empty at a non-zero
    /// offset the window has nothing to report, so `count` (a bare
    /// `SELECT COUNT(*)`) runs in the same transaction to keep the total
    /// stable past the end.
    pub async fn fetch_page<T>(
        &self,
        page: Statement,
        count: Statement,
        window: Pagination,
        timeout: Duration,
    ) -> Result<(Vec<T>, i64), AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send,
    {
        let page = page.bind(window.limit()).bind(window.offset());
        tracing::debug!(sql = page.sql(), args = ?page.args(), "page");
        let past_start = window.offset() > 0;
        self.transaction(AccessMode::ReadOnly, timeout, move |tx| {
            Box::pin(async move {
                let rows = page.query().fetch_all(&mut **tx).await?;
                if rows.is_empty() {
                    if !past_start {
                        return Ok((Vec::new(), 0));
                    }
                    let total: i64 = count.query().fetch_one(&mut **tx).await?.try_get(0)?;
                    return Ok((Vec::new(), total));
                }

                let total: i64 = rows[0].try_get("total")?;
                let items = rows
                    .iter()
                    .map(|row| T::from_row(row))
                    .collect::<Result<Vec<T>, sqlx::Error>>()?;
                Ok((items, total))
            })
        })
        .await
    }

    /// Page fetch with the budget used for multi-join listings.
    pub async fn fetch_joined_page<T>(
        &self,
        page: Statement,
        count: Statement,
        window: Pagination,
    ) -> Result<(Vec<T>, i64), AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send,
    {
        self.fetch_page(page, count, window, LONG_QUERY_TIMEOUT).await
    }
}
