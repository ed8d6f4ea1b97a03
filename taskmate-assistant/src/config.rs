/// Configuration for the chat binary
///
/// # Environment Variables
///
/// - `TASKMATE_API_URL`: server root (default: http://localhost:5000)
/// - `TASKMATE_EMAIL`, `TASKMATE_PASSWORD`: account to log in as (required)
/// - `OPENAI_API_KEY`: provider key (required)
/// - `OPENAI_MODEL`: model name (default: gpt-3.5-turbo)
/// - `OPENAI_BASE_URL`: any OpenAI-compatible endpoint (default: https://api.openai.com/v1)

use std::env;

use crate::openai::{OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    pub email: String,
    pub password: String,
    pub openai: OpenAiConfig,
}

impl ChatConfig {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            api_url: var_or("TASKMATE_API_URL", "http://localhost:5000"),
            email: required("TASKMATE_EMAIL")?,
            password: required("TASKMATE_PASSWORD")?,
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                model: var_or("OPENAI_MODEL", DEFAULT_MODEL),
                base_url: var_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            },
        })
    }
}
