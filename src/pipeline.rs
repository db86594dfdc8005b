//! Natural-language-to-SQL pipeline.
//!
//! ```text
//! prompt ──▶ generator ──▶ sanitize ──▶ guard ──▶ database ──▶ QueryResponse
//!                │                        │           │
//!                └──── Failure ◀──────────┴───────────┘
//! ```
//!
//! Each submission runs the stages once, in order. Every failure is caught
//! here and turned into a [`QueryResponse`] with `success == false`; callers
//! never see an error. Nothing is retried.

mod hints;
mod types;

pub use hints::tips_for;
pub use types::{Failure, FailureKind, QueryResponse};

use crate::{
    db::Database,
    guard::{self, SqlDialect},
    llm::QueryGenerator,
    sanitize::sanitize
};

/// Message for any generator failure; the cause is only logged
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate SQL query";

/// Message for blank generator output
pub const EMPTY_OUTPUT_MESSAGE: &str =
    "The AI returned an empty query. Try rephrasing your request.";

/// Message for infrastructure failures
pub const INTERNAL_FAILURE_MESSAGE: &str = "An unexpected error occurred";

/// Generator plus database, ready to answer prompts.
pub struct QueryPipeline<G> {
    generator: G,
    db:        Database,
    dialect:   SqlDialect
}

impl<G: QueryGenerator> QueryPipeline<G> {
    pub fn new(generator: G, db: Database) -> Self {
        Self {
            generator,
            db,
            dialect: SqlDialect::default()
        }
    }

    /// Parse generated SQL with a different dialect
    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate, sanitize, guard and execute.
    pub async fn ask(&self, prompt: &str) -> QueryResponse {
        match self.generate(prompt).await {
            Ok(raw) => execute_sql(&self.db, &raw, self.dialect).await,
            Err(failure) => QueryResponse::failed(None, failure)
        }
    }

    /// Generate, sanitize and guard, without touching the database.
    pub async fn preview(&self, prompt: &str) -> QueryResponse {
        let raw = match self.generate(prompt).await {
            Ok(raw) => raw,
            Err(failure) => return QueryResponse::failed(None, failure)
        };
        match prepare(&raw, self.dialect) {
            Ok(sql) => QueryResponse::preview(sql),
            Err((sql, failure)) => QueryResponse::failed(sql, failure)
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, Failure> {
        tracing::info!(prompt, "generating SQL");
        let raw = self.generator.generate_sql(prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "SQL generation failed");
            Failure::new(FailureKind::Generation, GENERATION_FAILED_MESSAGE)
        })?;
        if raw.trim().is_empty() {
            tracing::warn!("generator returned blank output");
            return Err(Failure::new(FailureKind::EmptyOutput, EMPTY_OUTPUT_MESSAGE));
        }
        tracing::debug!(raw = %raw, "generator output");
        Ok(raw)
    }
}

/// Sanitize and guard a candidate statement.
///
/// On failure, returns the sanitized text (when there is any) with the
/// failure, so it can still be shown to the user.
pub fn prepare(raw: &str, dialect: SqlDialect) -> Result<String, (Option<String>, Failure)> {
    let sql = sanitize(raw);
    if sql.is_empty() {
        return Err((None, Failure::new(FailureKind::EmptyOutput, EMPTY_OUTPUT_MESSAGE)));
    }
    tracing::debug!(sql = %sql, "sanitized SQL");
    match guard::check(&sql, dialect) {
        Ok(checked) => {
            tracing::debug!(
                normalized = %checked.normalized,
                tables = ?checked.tables,
                "statement passed guard"
            );
            Ok(sql)
        }
        Err(rejection) => {
            tracing::warn!(sql = %sql, reason = %rejection, "statement rejected");
            let failure = Failure::new(FailureKind::Rejected, rejection.to_string()).with_hints();
            Err((Some(sql), failure))
        }
    }
}

/// Run a candidate statement (generated or typed by hand) end to end.
pub async fn execute_sql(db: &Database, raw: &str, dialect: SqlDialect) -> QueryResponse {
    let sql = match prepare(raw, dialect) {
        Ok(sql) => sql,
        Err((sql, failure)) => return QueryResponse::failed(sql, failure)
    };
    match db.query_rows(&sql).await {
        Ok(Ok(rows)) => {
            tracing::info!(rows = rows.len(), "query executed");
            QueryResponse::ok(sql, rows)
        }
        Ok(Err(message)) => {
            tracing::warn!(sql = %sql, error = %message, "query failed");
            let failure = Failure::new(FailureKind::Execution, message).with_hints();
            QueryResponse::failed(Some(sql), failure)
        }
        Err(e) => {
            tracing::error!(error = %e, "database unavailable");
            QueryResponse::failed(
                Some(sql),
                Failure::new(FailureKind::Internal, INTERNAL_FAILURE_MESSAGE)
            )
        }
    }
}
