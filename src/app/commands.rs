//! Command handlers.
//!
//! Each handler opens what it needs, does its work and renders the result.
//! Pipeline failures become a non-zero exit code with the failure printed
//! to stdout; infrastructure errors propagate to `main`.

use std::{path::Path, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use super::{
    convert::convert_dialect,
    helpers::provider_from_args,
    types::CommandOutput
};
use crate::{
    cli::{Dialect, LlmArgs, PostCommands, UserCommands},
    config::Config,
    db::Database,
    error::AppResult,
    llm::LlmClient,
    output::{
        GreetingResult, OutputOptions, format_confirmation, format_greeting, format_posts,
        format_query_response, format_users
    },
    pipeline::{QueryPipeline, QueryResponse, execute_sql}
};

/// Shown when the model answers the greeting with nothing
pub const NO_RESPONSE_MESSAGE: &str = "No response from AI";

/// Shown when the greeting request itself fails
pub const GREETING_FAILED_MESSAGE: &str = "Failed to get AI response";

/// Parameters for the ask command.
#[derive(Debug, Clone)]
pub struct AskParams {
    pub prompt:  String,
    pub llm:     LlmArgs,
    pub dialect: Dialect,
    pub dry_run: bool
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Exit code for a pipeline response
pub fn response_exit_code(response: &QueryResponse) -> i32 {
    if response.success { 0 } else { 1 }
}

fn render_response(response: &QueryResponse, opts: &OutputOptions) -> CommandOutput {
    CommandOutput {
        exit_code: response_exit_code(response),
        stdout:    format_query_response(response, opts)
    }
}

/// Turn a natural-language question into SQL and run it.
///
/// With `dry_run`, the statement is generated and validated but the
/// database file is never opened.
pub async fn run_ask(
    params: AskParams,
    db_path: &Path,
    config: &Config,
    opts: &OutputOptions
) -> AppResult<CommandOutput> {
    let provider = provider_from_args(&params.llm, config)?;
    let db = if params.dry_run {
        Database::open_in_memory()?
    } else {
        Database::open(db_path)?
    };
    let pipeline = QueryPipeline::new(LlmClient::new(provider), db)
        .with_dialect(convert_dialect(params.dialect));

    let pb = spinner("Generating SQL...");
    let response = if params.dry_run {
        pipeline.preview(&params.prompt).await
    } else {
        pipeline.ask(&params.prompt).await
    };
    pb.finish_and_clear();

    Ok(render_response(&response, opts))
}

/// Sanitize, validate and run hand-written SQL.
pub async fn run_exec(
    sql: &str,
    dialect: Dialect,
    db_path: &Path,
    opts: &OutputOptions
) -> AppResult<CommandOutput> {
    let db = Database::open(db_path)?;
    let response = execute_sql(&db, sql, convert_dialect(dialect)).await;
    Ok(render_response(&response, opts))
}

/// Map the greeting call result to what the user sees.
///
/// # Example
///
/// ```
/// use blog_query::app::greeting_message;
///
/// let (ok, message) = greeting_message(Ok(String::from("  Hello!\n")));
/// assert!(ok);
/// assert_eq!(message, "Hello!");
/// ```
pub fn greeting_message(result: AppResult<String>) -> (bool, String) {
    match result {
        Ok(text) if text.trim().is_empty() => (false, NO_RESPONSE_MESSAGE.to_string()),
        Ok(text) => (true, text.trim().to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "greeting request failed");
            (false, GREETING_FAILED_MESSAGE.to_string())
        }
    }
}

/// Ask the model for a greeting and a joke.
pub async fn run_greet(
    llm: &LlmArgs,
    config: &Config,
    opts: &OutputOptions
) -> AppResult<CommandOutput> {
    let client = LlmClient::new(provider_from_args(llm, config)?);
    let pb = spinner("Asking the AI...");
    let result = client.greet().await;
    pb.finish_and_clear();

    let (success, message) = greeting_message(result);
    let stdout = format_greeting(
        &GreetingResult {
            success,
            message: &message
        },
        opts
    );
    Ok(if success {
        CommandOutput::success(stdout)
    } else {
        CommandOutput::failure(stdout)
    })
}

/// List, create or delete posts.
pub async fn run_posts(
    command: PostCommands,
    db_path: &Path,
    opts: &OutputOptions
) -> AppResult<CommandOutput> {
    let db = Database::open(db_path)?;
    match command {
        PostCommands::List => {
            let posts = db.list_posts().await?;
            Ok(CommandOutput::success(format_posts(&posts, opts)))
        }
        PostCommands::Create {
            title,
            content,
            author
        } => {
            let author_id = match author {
                Some(id) => id,
                None => db.ensure_default_user().await?.id
            };
            let post = db
                .create_post(&title, content.as_deref(), &author_id)
                .await?;
            tracing::info!(id = %post.id, "post created");
            let message = format!("Created post {}", post.id);
            Ok(CommandOutput::success(format_confirmation(&post, &message, opts)))
        }
        PostCommands::Delete {
            id
        } => {
            db.delete_post(&id).await?;
            tracing::info!(id = %id, "post deleted");
            let message = format!("Deleted post {}", id);
            Ok(CommandOutput::success(format_confirmation(
                &json!({ "deleted": id }),
                &message,
                opts
            )))
        }
    }
}

/// List or create users.
pub async fn run_users(
    command: UserCommands,
    db_path: &Path,
    opts: &OutputOptions
) -> AppResult<CommandOutput> {
    let db = Database::open(db_path)?;
    match command {
        UserCommands::List => {
            let users = db.list_users().await?;
            Ok(CommandOutput::success(format_users(&users, opts)))
        }
        UserCommands::Create {
            email,
            name
        } => {
            let user = db.create_user(&email, name.as_deref()).await?;
            let message = format!("Created user {} <{}>", user.id, user.email);
            Ok(CommandOutput::success(format_confirmation(&user, &message, opts)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::llm_api_error;

    #[test]
    fn test_greeting_blank_is_no_response() {
        let (ok, message) = greeting_message(Ok(String::from("   ")));
        assert!(!ok);
        assert_eq!(message, NO_RESPONSE_MESSAGE);
    }

    #[test]
    fn test_greeting_error_is_generic() {
        let (ok, message) = greeting_message(Err(llm_api_error("HTTP 500: boom")));
        assert!(!ok);
        assert_eq!(message, GREETING_FAILED_MESSAGE);
    }

    #[test]
    fn test_response_exit_code() {
        let ok = QueryResponse::ok(String::from("SELECT 1"), Vec::new());
        assert_eq!(response_exit_code(&ok), 0);
        let failed = QueryResponse::failed(
            None,
            crate::pipeline::Failure::new(crate::pipeline::FailureKind::Generation, "x")
        );
        assert_eq!(response_exit_code(&failed), 1);
    }
}
