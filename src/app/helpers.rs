//! Helper functions for CLI operations.
//!
//! Resolution of settings that can come from several places (flags,
//! environment, config file, defaults) and logging setup.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use super::convert::convert_format;
use crate::{
    cli::{Format, LlmArgs, Provider},
    config::{Config, LogConfig},
    error::{AppResult, config_error},
    llm::LlmProvider,
    output::OutputOptions
};

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Install the stderr log subscriber.
///
/// `--verbose` forces debug output for this crate; otherwise `RUST_LOG`
/// wins over the configured level. Calling it twice is harmless.
pub fn init_logging(verbose: bool, config: &LogConfig) {
    let filter = if verbose {
        EnvFilter::new("blog_query=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Creates output options from CLI parameters.
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  convert_format(format),
        colored: !no_color
    }
}

/// Database path: flag or `BLOG_DATABASE`, then config, then default
pub fn effective_database_path(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.unwrap_or_else(|| config.database.path.clone())
}

/// Provider: flag, then config, then OpenAI.
///
/// # Errors
///
/// Returns an error if the configured provider name is unknown.
pub fn resolve_provider(flag: Option<Provider>, config_name: Option<&str>) -> AppResult<Provider> {
    if let Some(provider) = flag {
        return Ok(provider);
    }
    match config_name {
        Some(name) => Provider::from_name(name)
            .ok_or_else(|| config_error(format!("Unknown LLM provider '{}'", name))),
        None => Ok(Provider::OpenAI)
    }
}

/// Gets the effective model name from available sources.
///
/// Resolves the model name in order of precedence:
/// 1. Explicitly provided model name
/// 2. Model from configuration file
/// 3. Default model for the provider
pub fn get_effective_model(
    model: Option<String>,
    config_model: Option<String>,
    provider: &Provider
) -> String {
    model
        .or(config_model)
        .unwrap_or_else(|| provider.default_model().to_string())
}

/// Gets the effective Ollama URL: flag, then config, then localhost.
pub fn get_effective_ollama_url(url: Option<String>, config_url: Option<String>) -> String {
    url.or(config_url)
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
}

/// Builds an LLM provider configuration.
///
/// For cloud providers (OpenAI, Anthropic) an API key is required.
///
/// # Errors
///
/// Returns an error if a cloud provider is selected without an API key.
pub fn build_llm_provider(
    provider: Provider,
    api_key: Option<String>,
    model: String,
    ollama_url: String
) -> AppResult<LlmProvider> {
    match provider {
        Provider::OpenAI => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::OpenAI {
                api_key: key,
                model
            })
        }
        Provider::Anthropic => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::Anthropic {
                api_key: key,
                model
            })
        }
        Provider::Ollama => Ok(LlmProvider::Ollama {
            base_url: ollama_url,
            model
        })
    }
}

/// Combine CLI LLM flags with configuration into a provider.
pub fn provider_from_args(args: &LlmArgs, config: &Config) -> AppResult<LlmProvider> {
    let provider = resolve_provider(args.provider, config.llm.provider.as_deref())?;
    let api_key = args.api_key.clone().or_else(|| config.llm.api_key.clone());
    let model = get_effective_model(args.model.clone(), config.llm.model.clone(), &provider);
    let ollama_url =
        get_effective_ollama_url(args.ollama_url.clone(), config.llm.ollama_url.clone());
    build_llm_provider(provider, api_key, model, ollama_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_provider_flag_wins() {
        let provider = resolve_provider(Some(Provider::Ollama), Some("anthropic")).unwrap();
        assert_eq!(provider, Provider::Ollama);
    }

    #[test]
    fn test_resolve_provider_from_config() {
        let provider = resolve_provider(None, Some("Anthropic")).unwrap();
        assert_eq!(provider, Provider::Anthropic);
    }

    #[test]
    fn test_resolve_provider_unknown_name() {
        assert!(resolve_provider(None, Some("gemini")).is_err());
    }

    #[test]
    fn test_resolve_provider_default() {
        assert_eq!(resolve_provider(None, None).unwrap(), Provider::OpenAI);
    }

    #[test]
    fn test_effective_model_precedence() {
        let provider = Provider::OpenAI;
        assert_eq!(
            get_effective_model(Some("a".into()), Some("b".into()), &provider),
            "a"
        );
        assert_eq!(get_effective_model(None, Some("b".into()), &provider), "b");
        assert_eq!(get_effective_model(None, None, &provider), "gpt-4o-mini");
    }

    #[test]
    fn test_effective_ollama_url_default() {
        assert_eq!(get_effective_ollama_url(None, None), DEFAULT_OLLAMA_URL);
        assert_eq!(
            get_effective_ollama_url(Some("http://gpu:11434".into()), None),
            "http://gpu:11434"
        );
    }

    #[test]
    fn test_build_openai_requires_key() {
        let result = build_llm_provider(
            Provider::OpenAI,
            None,
            "gpt-4o-mini".into(),
            DEFAULT_OLLAMA_URL.into()
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_ollama_without_key() {
        let provider = build_llm_provider(
            Provider::Ollama,
            None,
            "llama3.2".into(),
            DEFAULT_OLLAMA_URL.into()
        )
        .unwrap();
        assert!(matches!(provider, LlmProvider::Ollama { .. }));
    }

    #[test]
    fn test_database_path_flag_wins() {
        let config = Config::default();
        assert_eq!(
            effective_database_path(Some(PathBuf::from("x.db")), &config),
            PathBuf::from("x.db")
        );
        assert_eq!(effective_database_path(None, &config), config.database.path);
    }
}
