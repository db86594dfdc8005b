use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Example questions listed under `ask --help`
pub const ASK_EXAMPLES: &str = "\
Examples:
  blog-query ask \"Show me all posts with their authors\"
  blog-query ask \"Find all users who have written more than 1 post\"
  blog-query ask \"List the most recent 5 posts with their author names\"
  blog-query ask \"Count how many posts each user has written\"
  blog-query ask \"Find all posts that contain the word 'hello' in their content\"";

/// Blog Query - ask questions about users and posts in plain language
#[derive(Parser, Debug)]
#[command(name = "blog-query")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(short, long, global = true, env = "BLOG_DATABASE")]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
    pub output_format: Format,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn a question into SQL with the LLM and run it
    #[command(after_help = ASK_EXAMPLES)]
    Ask {
        /// Question about users and posts
        prompt: String,

        #[command(flatten)]
        llm: LlmArgs,

        /// SQL dialect for validating generated statements
        #[arg(long, value_enum, default_value = "sqlite")]
        dialect: Dialect,

        /// Show the generated SQL without executing it
        #[arg(long)]
        dry_run: bool
    },
    /// Sanitize, validate and run a SQL statement
    Exec {
        /// SQL text, as a model would produce it
        sql: String,

        /// SQL dialect for validation
        #[arg(long, value_enum, default_value = "sqlite")]
        dialect: Dialect
    },
    /// Ask the LLM for a greeting and a joke
    Greet {
        #[command(flatten)]
        llm: LlmArgs
    },
    /// Manage posts
    #[command(subcommand)]
    Posts(PostCommands),
    /// Manage users
    #[command(subcommand)]
    Users(UserCommands)
}

/// LLM connection options
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// LLM provider to use
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// API key for OpenAI or Anthropic
    #[arg(short, long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long)]
    pub ollama_url: Option<String>
}

#[derive(Subcommand, Debug)]
pub enum PostCommands {
    /// List posts with their authors, newest first
    List,
    /// Create a post
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post body
        #[arg(short, long)]
        content: Option<String>,

        /// Author id (defaults to the demo user)
        #[arg(long)]
        author: Option<String>
    },
    /// Delete a post by id
    Delete {
        /// Post id
        id: String
    }
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List,
    /// Create a user
    Create {
        /// Unique email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }

    /// Parse a provider name from configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" | "open-ai" => Some(Self::OpenAI),
            "anthropic" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Postgresql,
    Sqlite
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
