use blog_query::error::{
    config_error, database_error, describe_sqlite_error, file_read_error, llm_api_error,
    not_found_error
};

#[test]
fn test_file_read_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/config.toml", io_error);
    let _msg = error.to_string();
}

#[test]
fn test_llm_api_error() {
    let error = llm_api_error("OpenAI API error 500: upstream");
    let _msg = error.to_string();
}

#[test]
fn test_config_error() {
    let error = config_error("Unknown LLM provider 'gemini'");
    let _msg = error.to_string();
}

#[test]
fn test_not_found_error() {
    let error = not_found_error("Post 'p1' not found");
    let _msg = error.to_string();
}

#[test]
fn test_database_error_from_engine_failure() {
    let err = rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(19),
        Some(String::from("UNIQUE constraint failed: User.email"))
    );
    assert_eq!(describe_sqlite_error(&err), "UNIQUE constraint failed: User.email");
    let error = database_error("create user", err);
    let _msg = error.to_string();
}

#[test]
fn test_describe_sqlite_error_without_message() {
    let err = rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(1), None);
    assert!(!describe_sqlite_error(&err).is_empty());
}
