//! Result types returned by the query pipeline.
//!
//! Every pipeline run ends in a [`QueryResponse`]: either the executed SQL
//! with its rows, or a [`Failure`] describing which stage gave up. Nothing
//! else escapes the pipeline.

use std::fmt;

use serde::Serialize;

use crate::db::RowSet;

/// Stage at which a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The generator could not be reached or returned an error
    Generation,
    /// The generator answered with blank text
    EmptyOutput,
    /// The guard refused the statement
    Rejected,
    /// The database refused the statement
    Execution,
    /// Anything else
    Internal
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::EmptyOutput => write!(f, "empty output"),
            Self::Rejected => write!(f, "rejected"),
            Self::Execution => write!(f, "execution"),
            Self::Internal => write!(f, "internal")
        }
    }
}

/// A user-visible failure with optional remediation hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind:    FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tips:    Vec<String>
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tips: Vec::new()
        }
    }

    /// Attach the canned hints matching this failure's message
    pub fn with_hints(mut self) -> Self {
        self.tips = super::hints::tips_for(&self.message)
            .into_iter()
            .map(String::from)
            .collect();
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of one natural-language or raw SQL submission.
///
/// # Example
///
/// ```
/// use blog_query::pipeline::{Failure, FailureKind, QueryResponse};
///
/// let response = QueryResponse::failed(None, Failure::new(FailureKind::EmptyOutput, "blank"));
/// assert!(!response.success);
/// assert!(response.results.is_none());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    /// SQL that was (or would have been) executed, after sanitizing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<RowSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:   Option<Failure>
}

impl QueryResponse {
    pub fn ok(query: String, results: RowSet) -> Self {
        Self {
            success: true,
            query:   Some(query),
            results: Some(results),
            error:   None
        }
    }

    /// Statement accepted but not executed
    pub fn preview(query: String) -> Self {
        Self {
            success: true,
            query:   Some(query),
            results: None,
            error:   None
        }
    }

    pub fn failed(query: Option<String>, failure: Failure) -> Self {
        Self {
            success: false,
            query,
            results: None,
            error: Some(failure)
        }
    }

    /// Kind of failure, if the run failed
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|f| f.kind)
    }
}
