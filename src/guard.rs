//! Read-only allowlist for sanitized SQL.
//!
//! Model output is untrusted. Before anything reaches the database the guard
//! requires that the text:
//!
//! 1. parses as exactly one statement
//! 2. is a query whose body only reads (no `SELECT ... INTO`, no
//!    data-modifying CTEs)
//! 3. references only the blog tables or CTEs declared by the statement
//!
//! Prompt instructions asking the model for read-only SQL are not relied on.
//!
//! # Example
//!
//! ```
//! use blog_query::guard::{Rejection, SqlDialect, check};
//!
//! let ok = check("SELECT * FROM \"Post\"", SqlDialect::SQLite).unwrap();
//! assert_eq!(ok.tables[0].as_str(), "Post");
//!
//! let err = check("DELETE FROM \"Post\"", SqlDialect::SQLite).unwrap_err();
//! assert!(matches!(err, Rejection::NotReadOnly(_)));
//! ```

use std::{fmt, ops::ControlFlow};

use compact_str::CompactString;
use indexmap::IndexSet;
use sqlparser::{
    ast::{Query, SetExpr, Statement, Visit, Visitor, visit_relations},
    dialect::{Dialect, GenericDialect, PostgreSqlDialect, SQLiteDialect},
    parser::Parser
};

use crate::schema::Schema;

/// Message shown for any statement that could change data.
pub const READ_ONLY_MESSAGE: &str = "Only read operations are allowed for security reasons";

/// SQL dialect for parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum SqlDialect {
    Generic,
    PostgreSQL,
    #[default]
    SQLite
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {})
        }
    }
}

/// Kind of statement, used to explain rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Truncate,
    Drop,
    Other
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Create => write!(f, "CREATE"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Drop => write!(f, "DROP"),
            Self::Other => write!(f, "OTHER")
        }
    }
}

/// A statement that passed every check.
#[derive(Debug, Clone)]
pub struct GuardedQuery {
    /// Normalized statement text as rendered by the parser
    pub normalized: String,
    /// Canonical names of the blog tables it reads, in first-seen order
    pub tables:     Vec<CompactString>
}

/// Why a statement was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Text is not valid SQL for the dialect
    Unparseable(String),
    /// Zero or several statements
    StatementCount(usize),
    /// Statement could modify data or schema
    NotReadOnly(QueryType),
    /// Relation outside the whitelist
    UnknownTable(String)
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable(msg) => write!(f, "SQL syntax error: {}", msg),
            Self::StatementCount(0) => write!(f, "No SQL statement to execute"),
            Self::StatementCount(n) => {
                write!(f, "Only a single statement can be executed (found {})", n)
            }
            Self::NotReadOnly(_) => write!(f, "{}", READ_ONLY_MESSAGE),
            Self::UnknownTable(name) => write!(
                f,
                "Table {} is not available; queries may only read \"User\" and \"Post\"",
                name
            )
        }
    }
}

/// Check a sanitized statement against the read-only allowlist.
pub fn check(sql: &str, dialect: SqlDialect) -> Result<GuardedQuery, Rejection> {
    let parser_dialect = dialect.into_parser_dialect();
    let mut statements = Parser::parse_sql(parser_dialect.as_ref(), sql)
        .map_err(|e| Rejection::Unparseable(e.to_string()))?;
    if statements.len() != 1 {
        return Err(Rejection::StatementCount(statements.len()));
    }
    let statement = statements.remove(0);
    match &statement {
        Statement::Query(query) if is_read_only_query(query) => {}
        other => return Err(Rejection::NotReadOnly(classify(other)))
    }
    let cte_names = declared_ctes(&statement);

    let schema = Schema::blog();
    let mut tables = IndexSet::new();
    let flow = visit_relations(&statement, |relation| {
        let name = relation.to_string();
        if let Some(table) = schema.resolve(&name) {
            tables.insert(CompactString::from(table));
            ControlFlow::Continue(())
        } else if cte_names
            .iter()
            .any(|cte| cte.eq_ignore_ascii_case(name.trim_matches('"')))
        {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(name)
        }
    });
    if let ControlFlow::Break(name) = flow {
        return Err(Rejection::UnknownTable(name));
    }

    Ok(GuardedQuery {
        normalized: statement.to_string(),
        tables:     tables.into_iter().collect()
    })
}

/// Collects CTE names declared at any depth of a statement
#[derive(Default)]
struct CteNames(Vec<String>);

impl Visitor for CteNames {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            self.0
                .extend(with.cte_tables.iter().map(|cte| cte.alias.name.value.clone()));
        }
        ControlFlow::Continue(())
    }
}

fn declared_ctes(statement: &Statement) -> Vec<String> {
    let mut names = CteNames::default();
    let _ = statement.visit(&mut names);
    names.0
}

fn is_read_only_query(query: &Query) -> bool {
    let ctes_read_only = query
        .with
        .as_ref()
        .is_none_or(|with| with.cte_tables.iter().all(|cte| is_read_only_query(&cte.query)));
    ctes_read_only && is_read_only_body(&query.body)
}

fn is_read_only_body(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => select.into.is_none(),
        SetExpr::Query(query) => is_read_only_query(query),
        SetExpr::SetOperation {
            left,
            right,
            ..
        } => is_read_only_body(left) && is_read_only_body(right),
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        _ => false
    }
}

fn classify(statement: &Statement) -> QueryType {
    match statement {
        Statement::Query(_) => QueryType::Select,
        Statement::Insert(_) => QueryType::Insert,
        Statement::Update {
            ..
        } => QueryType::Update,
        Statement::Delete(_) => QueryType::Delete,
        Statement::CreateTable(_) | Statement::CreateIndex(_) => QueryType::Create,
        Statement::Truncate {
            ..
        } => QueryType::Truncate,
        Statement::Drop {
            ..
        } => QueryType::Drop,
        _ => QueryType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_into_is_not_read_only() {
        let result = check("SELECT * INTO backup FROM \"Post\"", SqlDialect::PostgreSQL);
        assert!(matches!(result, Err(Rejection::NotReadOnly(QueryType::Select))));
    }

    #[test]
    fn test_data_modifying_cte_rejected() {
        let sql = "WITH gone AS (DELETE FROM \"Post\" RETURNING id) SELECT * FROM gone";
        let result = check(sql, SqlDialect::PostgreSQL);
        assert!(matches!(
            result,
            Err(Rejection::NotReadOnly(_) | Rejection::Unparseable(_))
        ));
    }

    #[test]
    fn test_classify_drop() {
        let result = check("DROP TABLE \"Post\"", SqlDialect::SQLite);
        assert_eq!(result.unwrap_err(), Rejection::NotReadOnly(QueryType::Drop));
    }

    #[test]
    fn test_rejection_messages_not_empty() {
        assert!(!Rejection::StatementCount(0).to_string().is_empty());
        assert!(
            Rejection::StatementCount(2)
                .to_string()
                .contains("single statement")
        );
        assert_eq!(
            Rejection::NotReadOnly(QueryType::Delete).to_string(),
            READ_ONLY_MESSAGE
        );
    }
}
