use std::time::Duration;

use blog_query::{
    db::{DEFAULT_USER_EMAIL, DEFAULT_USER_NAME, Database},
    guard::READ_ONLY_MESSAGE
};
use tempfile::TempDir;

#[tokio::test]
async fn test_default_user_is_created_once() {
    let db = Database::open_in_memory().unwrap();
    let first = db.ensure_default_user().await.unwrap();
    let second = db.ensure_default_user().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.email, DEFAULT_USER_EMAIL);
    assert_eq!(first.name.as_deref(), Some(DEFAULT_USER_NAME));
    assert_eq!(db.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_default_user_reuses_existing_user() {
    let db = Database::open_in_memory().unwrap();
    let alice = db.create_user("alice@example.com", Some("Alice")).await.unwrap();
    let author = db.ensure_default_user().await.unwrap();
    assert_eq!(author.id, alice.id);
}

#[tokio::test]
async fn test_duplicate_email_fails() {
    let db = Database::open_in_memory().unwrap();
    db.create_user("a@example.com", None).await.unwrap();
    assert!(db.create_user("a@example.com", None).await.is_err());
}

#[tokio::test]
async fn test_post_requires_existing_author() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.create_post("Orphan", None, "no-such-user").await.is_err());
}

#[tokio::test]
async fn test_posts_listed_newest_first_with_author() {
    let db = Database::open_in_memory().unwrap();
    let author = db.ensure_default_user().await.unwrap();
    db.create_post("Older", Some("one"), &author.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    db.create_post("Newer", None, &author.id).await.unwrap();

    let posts = db.list_posts().await.unwrap();
    let titles: Vec<_> = posts.iter().map(|p| p.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
    assert_eq!(posts[0].author.email, DEFAULT_USER_EMAIL);
    assert_eq!(posts[1].post.content.as_deref(), Some("one"));
    assert!(posts[0].post.content.is_none());
}

#[tokio::test]
async fn test_delete_post() {
    let db = Database::open_in_memory().unwrap();
    let author = db.ensure_default_user().await.unwrap();
    let post = db.create_post("Bye", None, &author.id).await.unwrap();

    db.delete_post(&post.id).await.unwrap();
    assert!(db.list_posts().await.unwrap().is_empty());
    assert!(db.delete_post(&post.id).await.is_err());
}

#[tokio::test]
async fn test_query_rows_keeps_column_order() {
    let db = Database::open_in_memory().unwrap();
    db.ensure_default_user().await.unwrap();
    let rows = db
        .query_rows(r#"SELECT "name", "email", 42 AS answer, NULL AS empty FROM "User""#)
        .await
        .unwrap()
        .unwrap();

    let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["name", "email", "answer", "empty"]);
    assert_eq!(rows[0]["answer"], 42);
    assert!(rows[0]["empty"].is_null());
}

#[tokio::test]
async fn test_query_rows_reports_engine_message() {
    let db = Database::open_in_memory().unwrap();
    let result = db.query_rows("SELECT * FROM comments").await.unwrap();
    assert_eq!(result.unwrap_err(), "no such table: comments");
}

#[tokio::test]
async fn test_syntax_error_is_bare_message() {
    let db = Database::open_in_memory().unwrap();
    let message = db
        .query_rows("SELECT name FROM \"User\" WHERE WHERE")
        .await
        .unwrap()
        .unwrap_err();
    assert!(message.contains("syntax error"), "{}", message);
    assert!(!message.contains("offset"), "{}", message);
    assert!(!message.contains("SELECT name"), "{}", message);
}

#[tokio::test]
async fn test_query_rows_refuses_writes() {
    let db = Database::open_in_memory().unwrap();
    let author = db.ensure_default_user().await.unwrap();
    db.create_post("Keep", None, &author.id).await.unwrap();

    let result = db.query_rows(r#"DELETE FROM "Post""#).await.unwrap();
    assert_eq!(result.unwrap_err(), READ_ONLY_MESSAGE);
    assert_eq!(db.list_posts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_database_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blog.db");
    {
        let db = Database::open(&path).unwrap();
        let author = db.ensure_default_user().await.unwrap();
        db.create_post("Saved", None, &author.id).await.unwrap();
    }
    let reopened = Database::open(&path).unwrap();
    let posts = reopened.list_posts().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post.title, "Saved");
}
