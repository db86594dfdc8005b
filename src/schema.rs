//! Static description of the blog schema.
//!
//! The schema is fixed: two tables, `"User"` and `"Post"`, with
//! case-sensitive quoted names and camelCase columns. It serves three
//! consumers:
//!
//! - the generator, which embeds [`Schema::to_summary`] in its system prompt
//! - the sanitizer, which rewrites table references to their canonical form
//! - the guard, which resolves every relation through [`Schema::resolve`]
//!
//! # Example
//!
//! ```
//! use blog_query::schema::Schema;
//!
//! let schema = Schema::blog();
//!
//! assert_eq!(schema.resolve("post"), Some("Post"));
//! assert_eq!(schema.resolve("\"User\""), Some("User"));
//! assert_eq!(schema.resolve("comments"), None);
//!
//! let summary = schema.to_summary();
//! assert!(summary.contains("\"Post\""));
//! ```

use std::sync::LazyLock;

/// Complete information about a database table.
#[derive(Debug, Clone)]
pub struct TableInfo {
    /// Exact, case-sensitive table name
    pub name:    &'static str,
    /// Ordered list of columns
    pub columns: Vec<ColumnInfo>
}

/// Column metadata.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Column name
    pub name:        &'static str,
    /// SQL data type
    pub data_type:   &'static str,
    /// Whether NULL values are allowed
    pub is_nullable: bool,
    /// Whether this is a primary key column
    pub is_primary:  bool,
    /// Whether values must be unique
    pub is_unique:   bool
}

/// Foreign key between two tables.
#[derive(Debug, Clone)]
pub struct RelationInfo {
    pub from_table:  &'static str,
    pub from_column: &'static str,
    pub to_table:    &'static str,
    pub to_column:   &'static str
}

/// The blog schema: tables in declaration order plus their relations.
#[derive(Debug, Clone)]
pub struct Schema {
    pub tables:    Vec<TableInfo>,
    pub relations: Vec<RelationInfo>
}

static BLOG_SCHEMA: LazyLock<Schema> = LazyLock::new(build_blog_schema);

const fn column(
    name: &'static str,
    data_type: &'static str,
    is_nullable: bool,
    is_primary: bool,
    is_unique: bool
) -> ColumnInfo {
    ColumnInfo {
        name,
        data_type,
        is_nullable,
        is_primary,
        is_unique
    }
}

fn build_blog_schema() -> Schema {
    Schema {
        tables:    vec![
            TableInfo {
                name:    "User",
                columns: vec![
                    column("id", "TEXT", false, true, true),
                    column("email", "TEXT", false, false, true),
                    column("name", "TEXT", true, false, false),
                    column("createdAt", "TIMESTAMP", false, false, false),
                ]
            },
            TableInfo {
                name:    "Post",
                columns: vec![
                    column("id", "TEXT", false, true, true),
                    column("title", "TEXT", false, false, false),
                    column("content", "TEXT", true, false, false),
                    column("authorId", "TEXT", false, false, false),
                    column("createdAt", "TIMESTAMP", false, false, false),
                ]
            },
        ],
        relations: vec![RelationInfo {
            from_table:  "Post",
            from_column: "authorId",
            to_table:    "User",
            to_column:   "id"
        }]
    }
}

impl Schema {
    /// The shared blog schema
    pub fn blog() -> &'static Self {
        &BLOG_SCHEMA
    }

    /// Names of all known tables
    pub fn table_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.iter().map(|t| t.name)
    }

    /// Look up a table by name, ignoring case and surrounding double quotes.
    ///
    /// Returns the canonical spelling, or `None` for anything outside the
    /// whitelist. Qualified names (`main.User`) never resolve.
    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        let bare = name.trim().trim_matches('"');
        if bare.is_empty() || bare.contains('.') || bare.contains('"') {
            return None;
        }
        self.table_names()
            .find(|table| table.eq_ignore_ascii_case(bare))
    }

    /// Get summary of schema for the generator's system prompt
    pub fn to_summary(&self) -> String {
        let mut summary = String::from("Database Schema:\n\n");
        for table in &self.tables {
            summary.push_str(&format!("Table: \"{}\"\n", table.name));
            summary.push_str("Columns:\n");
            for col in &table.columns {
                let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
                let primary = if col.is_primary { " PRIMARY KEY" } else { "" };
                let unique = if col.is_unique && !col.is_primary { " UNIQUE" } else { "" };
                summary.push_str(&format!(
                    "  - \"{name}\" {data_type} {nullable}{primary}{unique}\n",
                    name = col.name,
                    data_type = col.data_type
                ));
            }
            summary.push('\n');
        }
        if !self.relations.is_empty() {
            summary.push_str("Relations:\n");
            for rel in &self.relations {
                summary.push_str(&format!(
                    "  - \"{}\".\"{}\" REFERENCES \"{}\".\"{}\"\n",
                    rel.from_table, rel.from_column, rel.to_table, rel.to_column
                ));
            }
        }
        summary
    }
}
