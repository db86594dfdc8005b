//! Canned remediation hints for known failure messages.
//!
//! Messages from both PostgreSQL and SQLite are recognized, since generated
//! SQL is often written for the former.

/// Hint for a missing table
pub const MISSING_RELATION_TIP: &str =
    "Table names are case-sensitive: refer to them as \"User\" and \"Post\", with double quotes.";

/// Hint for a missing column
pub const MISSING_COLUMN_TIP: &str = "Check the column names: \"User\" has id, email, name, \
                                      createdAt; \"Post\" has id, title, content, authorId, \
                                      createdAt.";

/// Hint for an empty quoted identifier
pub const EMPTY_IDENTIFIER_TIP: &str =
    "The query contains an empty quoted identifier (\"\"). Try rephrasing your request.";

/// Hint for any other syntax error
pub const SYNTAX_TIP: &str =
    "The generated SQL is not valid. Try a simpler or more specific request.";

/// Return every hint whose signature appears in `message`.
pub fn tips_for(message: &str) -> Vec<&'static str> {
    let msg = message.to_lowercase();
    let mut tips = Vec::new();
    if msg.contains("no such table") || (msg.contains("relation") && msg.contains("does not exist"))
    {
        tips.push(MISSING_RELATION_TIP);
    }
    if msg.contains("no such column") || (msg.contains("column") && msg.contains("does not exist"))
    {
        tips.push(MISSING_COLUMN_TIP);
    }
    if msg.contains("zero-length delimited identifier") {
        tips.push(EMPTY_IDENTIFIER_TIP);
    } else if msg.contains("syntax error") {
        tips.push(SYNTAX_TIP);
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_missing_relation() {
        assert_eq!(
            tips_for("relation \"post\" does not exist"),
            vec![MISSING_RELATION_TIP]
        );
    }

    #[test]
    fn test_sqlite_missing_column() {
        assert_eq!(tips_for("no such column: p.author"), vec![MISSING_COLUMN_TIP]);
    }

    #[test]
    fn test_empty_identifier_beats_generic_syntax() {
        let tips = tips_for("syntax error: zero-length delimited identifier at or near \"\"\"\"");
        assert_eq!(tips, vec![EMPTY_IDENTIFIER_TIP]);
    }

    #[test]
    fn test_generic_syntax_error() {
        assert_eq!(tips_for("near \"SELEC\": syntax error"), vec![SYNTAX_TIP]);
    }

    #[test]
    fn test_unknown_message_has_no_tips() {
        assert!(tips_for("database is locked").is_empty());
    }
}
