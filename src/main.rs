//! # Blog Query
//!
//! Ask questions about a blog database in plain language.
//!
//! `blog-query` keeps users and posts in a SQLite file and lets you query
//! them through an LLM. The model writes a SQL statement, the statement is
//! cleaned up and checked, and only single read-only queries over `"User"`
//! and `"Post"` ever reach the database.
//!
//! # Quick Start
//!
//! ```bash
//! # Add some content
//! blog-query posts create -t "Hello world" -c "First post"
//! blog-query posts list
//!
//! # Ask a question
//! export LLM_API_KEY="sk-..."
//! blog-query ask "how many posts does each user have?"
//!
//! # Local model, show the SQL without running it
//! blog-query ask --provider ollama --dry-run "latest three posts"
//!
//! # Run SQL directly through the same checks
//! blog-query exec 'SELECT title FROM Post ORDER BY "createdAt" DESC'
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`LLM_API_KEY`, `OPENAI_API_KEY`, `LLM_PROVIDER`,
//!    `LLM_MODEL`, `OLLAMA_URL`, `BLOG_DATABASE`)
//! 3. `.blog-query.toml` in current directory
//! 4. `~/.config/blog-query/config.toml`
//!
//! ## Example Configuration
//!
//! ```toml
//! [llm]
//! provider = "ollama"
//! model = "llama3.2"
//! ollama_url = "http://localhost:11434"
//!
//! [database]
//! path = "blog.db"
//!
//! [log]
//! level = "info"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - The query was rejected or failed, or the command errored
//!
//! # Output Formats
//!
//! - `text` - Human-readable colored output (default)
//! - `json` - Structured JSON for programmatic processing
//! - `yaml` - YAML output

use std::process;

use blog_query::{app, cli::Cli, config::Config};
use clap::Parser;
use tokio::main;

#[main]
async fn main() {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    app::init_logging(cli.verbose, &config.log);

    match app::run(cli, &config).await {
        Ok(output) => {
            print!("{}", output.stdout);
            process::exit(output.exit_code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
