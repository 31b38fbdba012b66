use std::time::Duration;

use anyhow::{Context, Result};

/// Which generation backend supplies conversational phrasing.
/// `Templates` runs the whole screening on deterministic fallback text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmMode {
    Ollama,
    Templates,
}

/// Application configuration loaded once from environment variables and
/// passed explicitly to whoever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional: without it the in-memory record store is used.
    pub database_url: Option<String>,
    pub llm_mode: LlmMode,
    pub ollama_url: String,
    pub ollama_model: String,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_mode = match std::env::var("LLM_MODE").as_deref() {
            Ok("templates") | Ok("off") => LlmMode::Templates,
            Ok("ollama") | Err(_) => LlmMode::Ollama,
            Ok(other) => anyhow::bail!("LLM_MODE must be 'ollama' or 'templates', got '{other}'"),
        };

        let llm_timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("LLM_TIMEOUT_SECS must be a number of seconds")?;

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok(),
            llm_mode,
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "phi3:mini".to_string()),
            llm_timeout: Duration::from_secs(llm_timeout_secs),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
