pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create LLM API error
pub fn llm_api_error(message: impl Into<String>) -> AppError {
    AppError::service(message.into())
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> AppError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else {
        err.to_string()
    };
    AppError::service(msg)
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create database error with the operation that failed
pub fn database_error(action: &str, err: rusqlite::Error) -> AppError {
    let detail = describe_sqlite_error(&err);
    tracing::error!(action, error = %detail, "database operation failed");
    AppError::internal(format!("Failed to {}: {}", action, detail))
}

/// Create not found error
pub fn not_found_error(message: impl Into<String>) -> AppError {
    AppError::not_found(message.into())
}

/// Render a SQLite error as the bare engine message.
///
/// `rusqlite` wraps engine failures as `SqliteFailure(code, Some(msg))` and
/// prepare-time syntax errors as `SqlInputError`, whose display repeats the
/// whole statement and an offset. Only the message is kept.
pub fn describe_sqlite_error(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.clone(),
        rusqlite::Error::SqlInputError {
            msg, ..
        } => msg.clone(),
        other => other.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_sqlite_failure_uses_engine_message() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some(String::from("no such table: comments"))
        );
        assert_eq!(describe_sqlite_error(&err), "no such table: comments");
    }

    #[test]
    fn test_describe_other_error_falls_back_to_display() {
        let err = rusqlite::Error::QueryReturnedNoRows;
        assert!(!describe_sqlite_error(&err).is_empty());
    }
}
