//! Annotating wrapper for SeaORM connections.
//!
//! Requires the `sea-orm` cargo feature.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    ExecResult, IsolationLevel, QueryResult, Statement, StreamTrait, TransactionError,
    TransactionTrait,
};

use crate::annotate::annotate_with;
use crate::callsite::CallSite;
use crate::labels::QueryLabels;

/// A wrapper around SeaORM's `DatabaseConnection` that annotates every
/// outgoing statement.
///
/// Implements `ConnectionTrait`, `StreamTrait`, and `TransactionTrait`, so
/// it is a drop-in replacement for `DatabaseConnection`. Each statement's
/// SQL is passed through the annotator before it reaches the database;
/// statements that already carry an annotation are forwarded untouched
/// unless the labels request override.
///
/// Call-site fields are empty at this layer: the wrapper sits below the
/// code that logically issued the query. Use the [`annotate!`] macro at the
/// call site when file/line/function attribution matters.
///
/// # Example
///
/// ```rust,ignore
/// use sea_orm::Database;
/// use intermix::{AnnotateExt, QueryLabels};
///
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let labels = QueryLabels::new("billing-api", 3).with_dag("nightly").with_task("rollup");
/// let annotated_db = db.with_annotation(labels);
///
/// // All queries through annotated_db now carry the metadata comment.
/// let users = Users::find().all(&annotated_db).await?;
/// ```
///
/// [`annotate!`]: crate::annotate!
#[derive(Debug, Clone)]
pub struct AnnotatingConnection {
    inner: DatabaseConnection,
    labels: Arc<QueryLabels>,
}

impl AnnotatingConnection {
    /// Wrap a connection with the given labels.
    pub fn new(connection: DatabaseConnection, labels: QueryLabels) -> Self {
        Self {
            inner: connection,
            labels: Arc::new(labels),
        }
    }

    /// Get a reference to the underlying `DatabaseConnection`.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// The labels stamped onto every statement.
    pub fn labels(&self) -> &QueryLabels {
        &self.labels
    }

    /// Consume the wrapper and return the inner `DatabaseConnection`.
    pub fn into_inner(self) -> DatabaseConnection {
        self.inner
    }

    fn annotate_statement(&self, stmt: Statement) -> Statement {
        let sql = annotate_with(&stmt.sql, &self.labels, CallSite::unknown());
        Statement { sql, ..stmt }
    }
}

#[async_trait]
impl ConnectionTrait for AnnotatingConnection {
    fn get_database_backend(&self) -> DbBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.inner.execute(self.annotate_statement(stmt)).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        let sql = annotate_with(sql, &self.labels, CallSite::unknown());
        self.inner.execute_unprepared(&sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.inner.query_one(self.annotate_statement(stmt)).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.inner.query_all(self.annotate_statement(stmt)).await
    }

    fn support_returning(&self) -> bool {
        self.inner.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.inner.is_mock_connection()
    }
}

impl StreamTrait for AnnotatingConnection {
    type Stream<'a> = <DatabaseConnection as StreamTrait>::Stream<'a>;

    fn stream<'a>(
        &'a self,
        stmt: Statement,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream<'a>, DbErr>> + 'a + Send>> {
        let stmt = self.annotate_statement(stmt);
        self.inner.stream(stmt)
    }
}

// Transaction control statements carry no user SQL; they pass through.
#[async_trait]
impl TransactionTrait for AnnotatingConnection {
    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.inner.begin().await
    }

    async fn begin_with_config(
        &self,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<DatabaseTransaction, DbErr> {
        self.inner.begin_with_config(isolation_level, access_mode).await
    }

    async fn transaction<F, T, E>(&self, callback: F) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        self.inner.transaction(callback).await
    }

    async fn transaction_with_config<F, T, E>(
        &self,
        callback: F,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        self.inner
            .transaction_with_config(callback, isolation_level, access_mode)
            .await
    }
}

/// Extension trait for wrapping connections fluently.
pub trait AnnotateExt {
    /// Wrap this connection so every statement is annotated with `labels`.
    fn with_annotation(self, labels: QueryLabels) -> AnnotatingConnection;
}

impl AnnotateExt for DatabaseConnection {
    fn with_annotation(self, labels: QueryLabels) -> AnnotatingConnection {
        AnnotatingConnection::new(self, labels)
    }
}
