//! Mock executor for testing
//!
//! Records every call it receives and answers from canned rows, without
//! touching a database. It's useful for:
//! - Checking what an [`Augmented`](crate::Augmented) executor delegates
//! - Simulating executor failures and latency
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlshape_exec::{Executor, MockExecutor, QueryContext};
//!
//! let mock = MockExecutor::builder()
//!     .with_row(vec![1.into(), "alice".into()])
//!     .build();
//!
//! let rows = mock.query(&QueryContext::new(), "SELECT id, email FROM users", vec![]).await?;
//! assert_eq!(mock.calls().await.len(), 1);
//! ```

use crate::adapter::{Executor, QueryContext};
use sqlshape_core::SqlValue;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Which executor operation was called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Exec,
    Query,
    QueryRow,
    Prepare,
}

/// One call as the mock received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub sql: String,
    pub args: Vec<SqlValue>,
}

/// Handle returned by [`MockExecutor::prepare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStatement {
    pub sql: String,
}

/// Errors the mock can return
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("No rows in result set")]
    NoRows,

    #[error("Simulated failure: {0}")]
    Simulated(String),
}

/// In-memory executor that records calls
pub struct MockExecutor {
    calls: Arc<RwLock<Vec<RecordedCall>>>,

    /// Rows returned by `query`; the first one by `query_row`
    rows: Vec<Vec<SqlValue>>,

    /// Affected-row count returned by `exec`
    affected: u64,

    /// Fail every call with this message
    failure: Option<String>,

    /// Simulate latency (milliseconds)
    latency_ms: u64,
}

impl MockExecutor {
    /// Create a mock with no rows
    pub fn new() -> Self {
        MockExecutorBuilder::new().build()
    }

    pub fn builder() -> MockExecutorBuilder {
        MockExecutorBuilder::new()
    }

    /// Calls received so far, oldest first
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// The most recent call
    pub async fn last_call(&self) -> Option<RecordedCall> {
        self.calls.read().await.last().cloned()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, kind: CallKind, sql: &str, args: Vec<SqlValue>) -> Result<(), MockError> {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }

        self.calls.write().await.push(RecordedCall {
            kind,
            sql: sql.to_string(),
            args,
        });

        match &self.failure {
            Some(message) => Err(MockError::Simulated(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockExecutor {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            rows: self.rows.clone(),
            affected: self.affected,
            failure: self.failure.clone(),
            latency_ms: self.latency_ms,
        }
    }
}

#[async_trait::async_trait]
impl Executor for MockExecutor {
    type Outcome = u64;
    type Rows = Vec<Vec<SqlValue>>;
    type Row = Vec<SqlValue>;
    type Statement = MockStatement;
    type Error = MockError;

    async fn exec(
        &self,
        _ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Outcome, Self::Error> {
        self.record(CallKind::Exec, sql, args).await?;
        Ok(self.affected)
    }

    async fn query(
        &self,
        _ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Rows, Self::Error> {
        self.record(CallKind::Query, sql, args).await?;
        Ok(self.rows.clone())
    }

    async fn query_row(
        &self,
        _ctx: &QueryContext,
        sql: &str,
        args: Vec<SqlValue>,
    ) -> Result<Self::Row, Self::Error> {
        self.record(CallKind::QueryRow, sql, args).await?;
        self.rows.first().cloned().ok_or(MockError::NoRows)
    }

    async fn prepare(&self, _ctx: &QueryContext, sql: &str) -> Result<Self::Statement, Self::Error> {
        self.record(CallKind::Prepare, sql, vec![]).await?;
        Ok(MockStatement { sql: sql.to_string() })
    }
}

/// Builder for creating a MockExecutor with canned results
pub struct MockExecutorBuilder {
    rows: Vec<Vec<SqlValue>>,
    affected: u64,
    failure: Option<String>,
    latency_ms: u64,
}

impl MockExecutorBuilder {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            affected: 0,
            failure: None,
            latency_ms: 0,
        }
    }

    /// Add a row returned by `query` / `query_row`
    pub fn with_row(mut self, row: Vec<SqlValue>) -> Self {
        self.rows.push(row);
        self
    }

    /// Affected-row count returned by `exec`
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Fail every call after recording it
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn build(self) -> MockExecutor {
        MockExecutor {
            calls: Arc::new(RwLock::new(Vec::new())),
            rows: self.rows,
            affected: self.affected,
            failure: self.failure,
            latency_ms: self.latency_ms,
        }
    }
}

impl Default for MockExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
