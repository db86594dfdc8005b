//! Application logic for the blog-query CLI.
//!
//! This module contains the command dispatch separated from the main
//! entry point to enable testing.

mod commands;
mod convert;
mod helpers;
mod types;

pub use commands::{
    AskParams, GREETING_FAILED_MESSAGE, NO_RESPONSE_MESSAGE, greeting_message,
    response_exit_code, run_ask, run_exec, run_greet, run_posts, run_users
};
pub use convert::{convert_dialect, convert_format};
pub use helpers::{
    DEFAULT_OLLAMA_URL, build_llm_provider, create_output_options, effective_database_path,
    get_effective_model, get_effective_ollama_url, init_logging, provider_from_args,
    resolve_provider
};
pub use types::CommandOutput;

use crate::{
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};

/// Run one parsed command line against the given configuration.
///
/// # Errors
///
/// Returns an error when the database cannot be opened, when a write
/// command fails, or when LLM settings are incomplete. Failures of the
/// query pipeline are reported through [`CommandOutput::exit_code`]
/// instead.
pub async fn run(cli: Cli, config: &Config) -> AppResult<CommandOutput> {
    let opts = create_output_options(cli.output_format, cli.no_color);
    let db_path = effective_database_path(cli.database, config);
    tracing::debug!(database = %db_path.display(), "resolved database path");

    match cli.command {
        Commands::Ask {
            prompt,
            llm,
            dialect,
            dry_run
        } => {
            let params = AskParams {
                prompt,
                llm,
                dialect,
                dry_run
            };
            run_ask(params, &db_path, config, &opts).await
        }
        Commands::Exec {
            sql,
            dialect
        } => run_exec(&sql, dialect, &db_path, &opts).await,
        Commands::Greet {
            llm
        } => run_greet(&llm, config, &opts).await,
        Commands::Posts(command) => run_posts(command, &db_path, &opts).await,
        Commands::Users(command) => run_users(command, &db_path, &opts).await
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn test_run_posts_create_then_list() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("blog.db");
        let db = db.to_str().unwrap();
        let config = Config::default();

        let created = run(
            cli(&["blog-query", "-d", db, "--no-color", "posts", "create", "-t", "Hello"]),
            &config
        )
        .await
        .unwrap();
        assert_eq!(created.exit_code, 0);
        assert!(created.stdout.starts_with("Created post "));

        let listed = run(cli(&["blog-query", "-d", db, "--no-color", "posts", "list"]), &config)
            .await
            .unwrap();
        assert!(listed.stdout.contains("Hello"));
        assert!(listed.stdout.contains("Demo User"));
    }

    #[tokio::test]
    async fn test_run_exec_rejects_delete() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("blog.db");
        let output = run(
            cli(&[
                "blog-query",
                "-d",
                db.to_str().unwrap(),
                "--no-color",
                "exec",
                "DELETE FROM Post"
            ]),
            &Config::default()
        )
        .await
        .unwrap();
        assert_eq!(output.exit_code, 1);
        assert!(output.stdout.contains(crate::guard::READ_ONLY_MESSAGE));
    }

    #[tokio::test]
    async fn test_run_posts_delete_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("blog.db");
        let result = run(
            cli(&["blog-query", "-d", db.to_str().unwrap(), "posts", "delete", "nope"]),
            &Config::default()
        )
        .await;
        assert!(result.is_err());
    }
}
