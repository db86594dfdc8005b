//! SQLite storage for users and posts.
//!
//! One connection sits behind a mutex and every call runs on the blocking
//! thread pool, so async callers only suspend while SQLite works.
//!
//! Two kinds of access are offered:
//!
//! - typed CRUD for the blog itself ([`Database::list_posts`],
//!   [`Database::create_post`], ...), failing with [`AppError`]
//! - [`Database::query_rows`] for generated statements, which reports
//!   statement failures as the engine's message so the caller can attach
//!   hints
//!
//! # Example
//!
//! ```no_run
//! use blog_query::db::Database;
//!
//! # async fn demo() -> blog_query::error::AppResult<()> {
//! let db = Database::open_in_memory()?;
//! let author = db.ensure_default_user().await?;
//! db.create_post("Hello", Some("First post"), &author.id).await?;
//!
//! let rows = db.query_rows("SELECT title FROM \"Post\"").await?.unwrap();
//! assert_eq!(rows[0]["title"], "Hello");
//! # Ok(())
//! # }
//! ```

use std::{
    path::Path,
    sync::{Arc, Mutex}
};

use indexmap::IndexMap;
use rusqlite::{Connection, OptionalExtension, Row as SqliteRow, params, types::ValueRef};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, database_error, describe_sqlite_error, not_found_error},
    guard::READ_ONLY_MESSAGE
};

/// One result row: column name to value, in statement column order
pub type Row = IndexMap<String, Value>;

/// Ordered rows returned by a query
pub type RowSet = Vec<Row>;

/// Email of the user created when the store is empty
pub const DEFAULT_USER_EMAIL: &str = "demo@example.com";

/// Display name of the default user
pub const DEFAULT_USER_NAME: &str = "Demo User";

const MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS "User" (
    "id"        TEXT PRIMARY KEY NOT NULL,
    "email"     TEXT NOT NULL UNIQUE,
    "name"      TEXT,
    "createdAt" TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE TABLE IF NOT EXISTS "Post" (
    "id"        TEXT PRIMARY KEY NOT NULL,
    "title"     TEXT NOT NULL,
    "content"   TEXT,
    "authorId"  TEXT NOT NULL REFERENCES "User"("id"),
    "createdAt" TIMESTAMP NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
"#;

const USER_COLUMNS: &str = r#""id", "email", "name", "createdAt""#;

const POST_COLUMNS: &str = r#""id", "title", "content", "authorId", "createdAt""#;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id:         String,
    pub email:      String,
    pub name:       Option<String>,
    pub created_at: String
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id:         String,
    pub title:      String,
    pub content:    Option<String>,
    pub author_id:  String,
    pub created_at: String
}

/// A post together with its author, as listed on the front page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post:   Post,
    pub author: User
}

/// Handle to the blog database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>
}

impl Database {
    /// Open (or create) a database file and apply the schema
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path).map_err(|e| database_error("open database", e))?;
        Self::init(conn)
    }

    /// Private in-memory database, used by tests and dry runs
    pub fn open_in_memory() -> AppResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| database_error("open database", e))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| database_error("enable foreign keys", e))?;
        conn.execute_batch(MIGRATION)
            .map_err(|e| database_error("apply schema", e))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn))
        })
    }

    async fn blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> T + Send + 'static,
        T: Send + 'static
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> AppResult<T> {
            let guard = conn
                .lock()
                .map_err(|_| AppError::internal(String::from("Database connection lock poisoned")))?;
            Ok(f(&guard))
        })
        .await
        .map_err(|e| AppError::internal(format!("Database task failed: {}", e)))?
    }

    /// Execute a generated statement and collect every row.
    ///
    /// The outer result fails only when the database itself is unusable.
    /// The inner error carries the engine message for a rejected statement.
    pub async fn query_rows(&self, sql: &str) -> AppResult<Result<RowSet, String>> {
        let sql = sql.to_string();
        self.blocking(move |conn| read_rows(conn, &sql)).await
    }

    pub async fn create_user(&self, email: &str, name: Option<&str>) -> AppResult<User> {
        let id = Uuid::now_v7().to_string();
        let email = email.to_string();
        let name = name.map(str::to_string);
        self.blocking(move |conn| {
            conn.query_row(
                &format!(
                    r#"INSERT INTO "User" ("id", "email", "name") VALUES (?1, ?2, ?3) RETURNING {USER_COLUMNS}"#
                ),
                params![id, email, name],
                user_from_row
            )
        })
        .await?
        .map_err(|e| database_error("create user", e))
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(&format!(
                r#"SELECT {USER_COLUMNS} FROM "User" ORDER BY "id""#
            ))?;
            let users = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>();
            users
        })
        .await?
        .map_err(|e| database_error("fetch users", e))
    }

    /// Oldest user, if any
    pub async fn first_user(&self) -> AppResult<Option<User>> {
        self.blocking(|conn| {
            conn.query_row(
                &format!(r#"SELECT {USER_COLUMNS} FROM "User" ORDER BY "id" LIMIT 1"#),
                [],
                user_from_row
            )
            .optional()
        })
        .await?
        .map_err(|e| database_error("fetch users", e))
    }

    /// Return the oldest user, creating the demo user when there is none
    pub async fn ensure_default_user(&self) -> AppResult<User> {
        if let Some(user) = self.first_user().await? {
            return Ok(user);
        }
        tracing::info!(email = DEFAULT_USER_EMAIL, "creating default user");
        self.create_user(DEFAULT_USER_EMAIL, Some(DEFAULT_USER_NAME))
            .await
    }

    /// All posts with their authors, newest first
    pub async fn list_posts(&self) -> AppResult<Vec<PostWithAuthor>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT p."id", p."title", p."content", p."authorId", p."createdAt",
                          u."id", u."email", u."name", u."createdAt"
                   FROM "Post" p
                   JOIN "User" u ON u."id" = p."authorId"
                   ORDER BY p."id" DESC"#
            )?;
            let posts = stmt
                .query_map([], |row| {
                    Ok(PostWithAuthor {
                        post:   post_from_row(row)?,
                        author: User {
                            id:         row.get(5)?,
                            email:      row.get(6)?,
                            name:       row.get(7)?,
                            created_at: row.get(8)?
                        }
                    })
                })?
                .collect::<Result<Vec<_>, _>>();
            posts
        })
        .await?
        .map_err(|e| database_error("fetch posts", e))
    }

    pub async fn create_post(
        &self,
        title: &str,
        content: Option<&str>,
        author_id: &str
    ) -> AppResult<Post> {
        let id = Uuid::now_v7().to_string();
        let title = title.to_string();
        let content = content.map(str::to_string);
        let author_id = author_id.to_string();
        self.blocking(move |conn| {
            conn.query_row(
                &format!(
                    r#"INSERT INTO "Post" ("id", "title", "content", "authorId") VALUES (?1, ?2, ?3, ?4) RETURNING {POST_COLUMNS}"#
                ),
                params![id, title, content, author_id],
                post_from_row
            )
        })
        .await?
        .map_err(|e| database_error("create post", e))
    }

    pub async fn delete_post(&self, post_id: &str) -> AppResult<()> {
        let id = post_id.to_string();
        let removed = self
            .blocking(move |conn| conn.execute(r#"DELETE FROM "Post" WHERE "id" = ?1"#, [id]))
            .await?
            .map_err(|e| database_error("delete post", e))?;
        if removed == 0 {
            return Err(not_found_error(format!("Post '{}' not found", post_id)));
        }
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id:         row.get(0)?,
        email:      row.get(1)?,
        name:       row.get(2)?,
        created_at: row.get(3)?
    })
}

fn post_from_row(row: &SqliteRow<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id:         row.get(0)?,
        title:      row.get(1)?,
        content:    row.get(2)?,
        author_id:  row.get(3)?,
        created_at: row.get(4)?
    })
}

fn read_rows(conn: &Connection, sql: &str) -> Result<RowSet, String> {
    let mut stmt = conn.prepare(sql).map_err(|e| describe_sqlite_error(&e))?;
    if !stmt.readonly() {
        return Err(READ_ONLY_MESSAGE.to_string());
    }
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let mut rows = stmt.query([]).map_err(|e| describe_sqlite_error(&e))?;
    let mut result = RowSet::new();
    while let Some(row) = rows.next().map_err(|e| describe_sqlite_error(&e))? {
        let mut record = Row::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            let value = row.get_ref(idx).map_err(|e| describe_sqlite_error(&e))?;
            record.insert(name.clone(), to_json(value));
        }
        result.push(record);
    }
    Ok(result)
}

/// Convert a SQLite value to JSON.
///
/// Text that holds a JSON object or array (as produced by `json_object`,
/// `json_group_array`, ...) is returned as the nested value.
fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            let trimmed = text.trim_start();
            if (trimmed.starts_with('{') || trimmed.starts_with('['))
                && let Ok(nested) = serde_json::from_str::<Value>(&text)
            {
                return nested;
            }
            Value::String(text.into_owned())
        }
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_scalars() {
        assert_eq!(to_json(ValueRef::Null), Value::Null);
        assert_eq!(to_json(ValueRef::Integer(7)), Value::from(7));
        assert_eq!(to_json(ValueRef::Text(b"hello")), Value::from("hello"));
    }

    #[test]
    fn test_to_json_nested_text() {
        let value = to_json(ValueRef::Text(br#"{"name":"Demo User"}"#));
        assert_eq!(value["name"], "Demo User");
    }

    #[test]
    fn test_to_json_braced_non_json_text() {
        let value = to_json(ValueRef::Text(b"{not json"));
        assert_eq!(value, Value::from("{not json"));
    }
}
