//! Cleanup of model-generated SQL before it reaches the guard.
//!
//! Language models routinely produce SQL that is almost right for this
//! database: wrapped in markdown fences, with table names in the wrong case
//! or unquoted, with doubled quote artifacts, or with a trailing `;`. The
//! sanitizer fixes exactly those artifacts for the two known tables and
//! nothing else. It is not a SQL parser and does not validate anything; the
//! [`guard`](crate::guard) does that afterwards.
//!
//! # Rewrites
//!
//! | Input | Output |
//! |-------|--------|
//! | ```` ```sql SELECT 1``` ```` | `SELECT 1` |
//! | `""User""` | `"User"` |
//! | `FROM user`, `JOIN post`, `UPDATE "user"` | `FROM "User"`, `JOIN "Post"`, `UPDATE "User"` |
//! | `post.title`, `"user".id` | `"Post".title`, `"User".id` |
//! | `SELECT 1;` | `SELECT 1` |
//!
//! # Example
//!
//! ```
//! use blog_query::sanitize::sanitize;
//!
//! let raw = "```sql\nSELECT post.title FROM post JOIN user ON post.\"authorId\" = user.id;\n```";
//! assert_eq!(
//!     sanitize(raw),
//!     "SELECT \"Post\".title FROM \"Post\" JOIN \"User\" ON \"Post\".\"authorId\" = \"User\".id"
//! );
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::schema::Schema;

/// Markdown code-fence markers, with an optional SQL language tag.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:sqlite|sql|postgresql|postgres|psql)?").expect("valid regex")
});

/// Two or more consecutive double quotes.
static DOUBLED_QUOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""{2,}"#).expect("valid regex"));

/// Table reference after a clause keyword, quoted or bare, any case.
/// Captures: 1 = keyword, 2 = whitespace, 3 = quoted name, 4 = bare name
static TABLE_CLAUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(FROM|JOIN|INSERT\s+INTO|UPDATE)(\s+)(?:"(user|post)"|(user|post)\b)"#)
        .expect("valid regex")
});

/// Table used as a column qualifier (`post.title`, `"user".id`).
/// Captures: 1 = quoted name, 2 = bare name
static QUALIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:"(user|post)"|\b(user|post))\."#).expect("valid regex")
});

/// Apply every rewrite in order and return the cleaned statement.
pub fn sanitize(raw: &str) -> String {
    let unfenced = strip_fences(raw);
    let collapsed = collapse_doubled_quotes(unfenced.trim());
    let tables = quote_table_references(&collapsed);
    let qualified = quote_table_qualifiers(&tables);
    strip_trailing_terminator(&qualified).to_string()
}

/// Remove all markdown fence markers.
pub fn strip_fences(sql: &str) -> String {
    FENCE_REGEX.replace_all(sql, "").into_owned()
}

/// Collapse `""` runs into a single `"`.
pub fn collapse_doubled_quotes(sql: &str) -> String {
    DOUBLED_QUOTE_REGEX.replace_all(sql, "\"").into_owned()
}

/// Rewrite table names following `FROM`, `JOIN`, `INSERT INTO` and `UPDATE`.
pub fn quote_table_references(sql: &str) -> String {
    TABLE_CLAUSE_REGEX
        .replace_all(sql, |caps: &Captures<'_>| {
            let name = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
            format!("{}{}{}", &caps[1], &caps[2], canonical(name))
        })
        .into_owned()
}

/// Rewrite `<table>.` qualifiers.
pub fn quote_table_qualifiers(sql: &str) -> String {
    QUALIFIER_REGEX
        .replace_all(sql, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!("{}.", canonical(name))
        })
        .into_owned()
}

/// Drop one trailing `;` and surrounding whitespace.
pub fn strip_trailing_terminator(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed.strip_suffix(';').map_or(trimmed, str::trim_end)
}

fn canonical(name: &str) -> String {
    match Schema::blog().resolve(name) {
        Some(table) => format!("\"{}\"", table),
        None => name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_with_language_tag() {
        assert_eq!(strip_fences("```sql\nSELECT 1\n```"), "\nSELECT 1\n");
    }

    #[test]
    fn test_doubled_quote_runs() {
        assert_eq!(collapse_doubled_quotes(r#"""User"""#), r#""User""#);
        assert_eq!(collapse_doubled_quotes(r#"""""Post"""#), r#""Post""#);
    }

    #[test]
    fn test_similar_table_names_untouched() {
        assert_eq!(quote_table_references("SELECT * FROM users"), "SELECT * FROM users");
        assert_eq!(
            quote_table_references("SELECT * FROM post_tags"),
            "SELECT * FROM post_tags"
        );
        assert_eq!(quote_table_qualifiers("SELECT myuser.id"), "SELECT myuser.id");
    }

    #[test]
    fn test_keyword_case_preserved() {
        assert_eq!(
            quote_table_references("select * from post"),
            "select * from \"Post\""
        );
    }

    #[test]
    fn test_single_terminator_only() {
        assert_eq!(strip_trailing_terminator("SELECT 1 ;  "), "SELECT 1");
        assert_eq!(strip_trailing_terminator("SELECT 1;;"), "SELECT 1;");
    }
}
