use std::path::PathBuf;

use blog_query::cli::{Cli, Commands, Dialect, Format, PostCommands, Provider, UserCommands};
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_provider_default_model_openai() {
    assert_eq!(Provider::OpenAI.default_model(), "gpt-4o-mini");
}

#[test]
fn test_provider_default_model_anthropic() {
    assert_eq!(Provider::Anthropic.default_model(), "claude-sonnet-4-20250514");
}

#[test]
fn test_provider_default_model_ollama() {
    assert_eq!(Provider::Ollama.default_model(), "llama3.2");
}

#[test]
fn test_provider_from_name() {
    assert_eq!(Provider::from_name("OpenAI"), Some(Provider::OpenAI));
    assert_eq!(Provider::from_name("open-ai"), Some(Provider::OpenAI));
    assert_eq!(Provider::from_name("ollama"), Some(Provider::Ollama));
    assert_eq!(Provider::from_name("gemini"), None);
}

#[test]
fn test_parse_ask_defaults() {
    let cli = parse(&["blog-query", "ask", "show me all posts"]);
    assert!(matches!(cli.output_format, Format::Text));
    assert!(!cli.no_color);
    match cli.command {
        Commands::Ask {
            prompt,
            llm,
            dialect,
            dry_run
        } => {
            assert_eq!(prompt, "show me all posts");
            assert!(llm.provider.is_none());
            assert!(llm.model.is_none());
            assert!(matches!(dialect, Dialect::Sqlite));
            assert!(!dry_run);
        }
        other => panic!("unexpected command: {:?}", other)
    }
}

#[test]
fn test_parse_ask_with_llm_options() {
    let cli = parse(&[
        "blog-query",
        "ask",
        "--provider",
        "ollama",
        "-m",
        "codellama",
        "--ollama-url",
        "http://gpu:11434",
        "--dialect",
        "postgresql",
        "--dry-run",
        "latest posts"
    ]);
    match cli.command {
        Commands::Ask {
            llm,
            dialect,
            dry_run,
            ..
        } => {
            assert_eq!(llm.provider, Some(Provider::Ollama));
            assert_eq!(llm.model.as_deref(), Some("codellama"));
            assert_eq!(llm.ollama_url.as_deref(), Some("http://gpu:11434"));
            assert!(matches!(dialect, Dialect::Postgresql));
            assert!(dry_run);
        }
        other => panic!("unexpected command: {:?}", other)
    }
}

#[test]
fn test_global_options_after_subcommand() {
    let cli = parse(&[
        "blog-query",
        "exec",
        "SELECT 1",
        "-d",
        "/tmp/x.db",
        "-f",
        "json",
        "--no-color"
    ]);
    assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
    assert!(matches!(cli.output_format, Format::Json));
    assert!(cli.no_color);
    assert!(matches!(cli.command, Commands::Exec { .. }));
}

#[test]
fn test_parse_posts_create() {
    let cli = parse(&[
        "blog-query",
        "posts",
        "create",
        "-t",
        "Hello",
        "-c",
        "Body"
    ]);
    match cli.command {
        Commands::Posts(PostCommands::Create {
            title,
            content,
            author
        }) => {
            assert_eq!(title, "Hello");
            assert_eq!(content.as_deref(), Some("Body"));
            assert!(author.is_none());
        }
        other => panic!("unexpected command: {:?}", other)
    }
}

#[test]
fn test_parse_posts_delete() {
    let cli = parse(&["blog-query", "posts", "delete", "abc"]);
    assert!(matches!(
        cli.command,
        Commands::Posts(PostCommands::Delete { id }) if id == "abc"
    ));
}

#[test]
fn test_parse_users_create() {
    let cli = parse(&["blog-query", "users", "create", "-e", "a@b.c", "-n", "Ann"]);
    assert!(matches!(
        cli.command,
        Commands::Users(UserCommands::Create { email, name: Some(name) }) if email == "a@b.c" && name == "Ann"
    ));
}

#[test]
fn test_missing_subcommand_fails() {
    assert!(Cli::try_parse_from(["blog-query"]).is_err());
}

#[test]
fn test_posts_create_requires_title() {
    assert!(Cli::try_parse_from(["blog-query", "posts", "create"]).is_err());
}

#[test]
fn test_invalid_provider_fails() {
    assert!(Cli::try_parse_from(["blog-query", "greet", "--provider", "gemini"]).is_err());
}
