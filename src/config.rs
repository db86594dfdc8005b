//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.blog-query.toml` in current directory
//! 4. `~/.config/blog-query/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [llm]
//! provider = "openai"          # openai, anthropic, ollama
//! model = "gpt-4o-mini"
//! api_key = "sk-..."           # or use LLM_API_KEY env var
//! ollama_url = "http://localhost:11434"
//!
//! [database]
//! path = "blog.db"
//!
//! [log]
//! level = "warn"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `LLM_API_KEY` | API key for OpenAI/Anthropic |
//! | `OPENAI_API_KEY` | Used when `LLM_API_KEY` is unset |
//! | `LLM_PROVIDER` | Provider name |
//! | `LLM_MODEL` | Model identifier |
//! | `OLLAMA_URL` | Ollama base URL |
//! | `BLOG_DATABASE` | SQLite database file |

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, config_error, file_read_error};

/// Default SQLite database file, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "blog.db";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm:      LlmConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log:      LogConfig
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider:   Option<String>,
    pub api_key:    Option<String>,
    pub model:      Option<String>,
    pub ollama_url: Option<String>
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider:   None,
            api_key:    None,
            model:      None,
            ollama_url: Some(String::from("http://localhost:11434"))
        }
    }
}

/// Database location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH)
        }
    }
}

/// Log filter used when `RUST_LOG` is not set
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("warn")
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.blog-query.toml)
    /// 3. Config file in home directory (~/.config/blog-query/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("blog-query")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".blog-query.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env();
        Ok(config)
    }

    /// Parse a single TOML config file
    pub fn from_file(path: &std::path::Path) -> AppResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = env::var("LLM_API_KEY").or_else(|_| env::var("OPENAI_API_KEY")) {
            self.llm.api_key = Some(api_key);
        }

        if let Ok(provider) = env::var("LLM_PROVIDER") {
            self.llm.provider = Some(provider);
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm.model = Some(model);
        }

        if let Ok(url) = env::var("OLLAMA_URL") {
            self.llm.ollama_url = Some(url);
        }

        if let Ok(path) = env::var("BLOG_DATABASE") {
            self.database.path = PathBuf::from(path);
        }
    }
}
