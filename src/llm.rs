//! LLM provider integrations for query generation.
//!
//! This module provides a unified interface for interacting with multiple LLM
//! providers. It handles authentication, request formatting and response
//! parsing. Requests are sent once; a failed call is reported to the caller,
//! never retried.
//!
//! # Supported Providers
//!
//! | Provider | Endpoint | Authentication |
//! |----------|----------|----------------|
//! | OpenAI | `api.openai.com` | Bearer token |
//! | Anthropic | `api.anthropic.com` | x-api-key header |
//! | Ollama | Local (configurable) | None |
//!
//! # Example
//!
//! ```
//! use blog_query::llm::{LlmClient, LlmProvider};
//!
//! let provider = LlmProvider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model:    "llama3.2".into()
//! };
//!
//! let client = LlmClient::new(provider);
//! ```

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppResult, http_error, llm_api_error},
    schema::Schema
};

/// System instruction for the greeting widget
pub const GREETING_SYSTEM_PROMPT: &str = "You are a helpful assistant with a good sense of humor.";

/// User message for the greeting widget
pub const GREETING_USER_PROMPT: &str = "Say hello world and tell me a short, clean joke!";

/// LLM provider configuration with authentication credentials.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// OpenAI API (GPT-4o, GPT-4o mini, etc.)
    OpenAI {
        /// API key (sk-...)
        api_key: String,
        /// Model identifier (e.g., "gpt-4o-mini")
        model:   String
    },
    /// Anthropic API (Claude models)
    Anthropic {
        /// API key
        api_key: String,
        /// Model identifier (e.g., "claude-sonnet-4-20250514")
        model:   String
    },
    /// Local Ollama instance
    Ollama {
        /// Base URL (e.g., "http://localhost:11434")
        base_url: String,
        /// Model name (e.g., "llama3.2", "codellama")
        model:    String
    }
}

/// Source of SQL text for a natural-language request.
///
/// [`LlmClient`] is the production implementation; the pipeline accepts any
/// implementation so it can run against a fixed response.
pub trait QueryGenerator {
    /// Return the model's raw answer for `prompt`, untouched
    fn generate_sql(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// HTTP client for LLM API communication.
///
/// Handles provider-specific request formatting and response parsing.
pub struct LlmClient {
    provider: LlmProvider,
    client:   reqwest::Client
}

#[derive(Serialize)]
struct OpenAIRequest {
    model:    String,
    messages: Vec<OpenAIRequestMessage>
}

#[derive(Serialize)]
struct OpenAIRequestMessage {
    role:    String,
    content: String
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>
}

#[derive(Serialize)]
struct AnthropicRequest {
    model:      String,
    max_tokens: u32,
    system:     String,
    messages:   Vec<AnthropicMessage>
}

#[derive(Serialize)]
struct AnthropicMessage {
    role:    String,
    content: String
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String
}

#[derive(Serialize)]
struct OllamaRequest {
    model:  String,
    system: String,
    prompt: String,
    stream: bool
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String
}

/// Build the system instruction for SQL generation.
///
/// The instruction embeds the schema summary and demands a bare, read-only
/// SQLite statement with exact quoted table names.
pub fn sql_system_prompt(schema: &Schema) -> String {
    format!(
        "You are an expert SQL assistant. Convert the user's request into a single \
         SQLite SELECT statement for the database described below.\n\n\
         Rules:\n\
         1. Respond with the SQL statement only: no explanations, no comments, no markdown.\n\
         2. Only read data. Never produce INSERT, UPDATE, DELETE, DROP, ALTER or CREATE.\n\
         3. Table names are case-sensitive: always write them as \"User\" and \"Post\", \
         with the double quotes.\n\
         4. Double-quote camelCase columns such as \"authorId\" and \"createdAt\".\n\
         5. Join posts to their authors with \"Post\".\"authorId\" = \"User\".\"id\".\n\n\
         {schema}",
        schema = schema.to_summary()
    )
}

impl LlmClient {
    /// Create new LLM client
    pub fn new(provider: LlmProvider) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            provider,
            client
        }
    }

    /// Ask the model for a greeting and a joke
    pub async fn greet(&self) -> AppResult<String> {
        self.complete(GREETING_SYSTEM_PROMPT, GREETING_USER_PROMPT)
            .await
    }

    /// Send one system + user exchange and return the reply text
    pub async fn complete(&self, system: &str, user: &str) -> AppResult<String> {
        match &self.provider {
            LlmProvider::OpenAI {
                api_key,
                model
            } => self.call_openai(api_key, model, system, user).await,
            LlmProvider::Anthropic {
                api_key,
                model
            } => self.call_anthropic(api_key, model, system, user).await,
            LlmProvider::Ollama {
                base_url,
                model
            } => self.call_ollama(base_url, model, system, user).await
        }
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        user: &str
    ) -> AppResult<String> {
        let request = OpenAIRequest {
            model:    model.to_string(),
            messages: vec![
                OpenAIRequestMessage {
                    role:    String::from("system"),
                    content: system.to_string()
                },
                OpenAIRequestMessage {
                    role:    String::from("user"),
                    content: user.to_string()
                },
            ]
        };
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "OpenAI API error {}: {}",
                status, text
            )));
        }
        let result: OpenAIResponse = response.json().await.map_err(http_error)?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| llm_api_error("Empty response from OpenAI"))
    }

    async fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        user: &str
    ) -> AppResult<String> {
        let request = AnthropicRequest {
            model:      model.to_string(),
            max_tokens: 1024,
            system:     system.to_string(),
            messages:   vec![AnthropicMessage {
                role:    String::from("user"),
                content: user.to_string()
            }]
        };
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Anthropic API error {}: {}",
                status, text
            )));
        }
        let result: AnthropicResponse = response.json().await.map_err(http_error)?;
        result
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| llm_api_error("Empty response from Anthropic"))
    }

    async fn call_ollama(
        &self,
        base_url: &str,
        model: &str,
        system: &str,
        user: &str
    ) -> AppResult<String> {
        let request = OllamaRequest {
            model:  model.to_string(),
            system: system.to_string(),
            prompt: user.to_string(),
            stream: false
        };
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Ollama API error {}: {}",
                status, text
            )));
        }
        let result: OllamaResponse = response.json().await.map_err(http_error)?;
        Ok(result.response)
    }
}

impl QueryGenerator for LlmClient {
    async fn generate_sql(&self, prompt: &str) -> AppResult<String> {
        let system = sql_system_prompt(Schema::blog());
        self.complete(&system, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_schema() {
        let prompt = sql_system_prompt(Schema::blog());
        assert!(prompt.contains("Table: \"User\""));
        assert!(prompt.contains("Table: \"Post\""));
        assert!(prompt.contains("\"authorId\""));
        assert!(prompt.contains("no markdown"));
    }

    #[tokio::test]
    async fn test_unreachable_ollama_is_an_error() {
        let client = LlmClient::new(LlmProvider::Ollama {
            base_url: String::from("http://127.0.0.1:9"),
            model:    String::from("llama3.2")
        });
        assert!(client.generate_sql("Show me all posts").await.is_err());
    }
}
