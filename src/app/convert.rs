//! Conversions from CLI-facing enums to internal types.

use crate::{
    cli::{Dialect, Format},
    guard::SqlDialect,
    output::OutputFormat
};

/// Converts a CLI dialect enum to the internal SQL dialect type.
///
/// # Example
///
/// ```
/// use blog_query::{app::convert_dialect, cli::Dialect, guard::SqlDialect};
///
/// let dialect = convert_dialect(Dialect::Postgresql);
/// assert!(matches!(dialect, SqlDialect::PostgreSQL));
/// ```
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite
    }
}

/// Converts a CLI format enum to the internal output format type.
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
