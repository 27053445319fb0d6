use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

use crate::search::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub api_key: String,
    pub inst_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            inst_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api: ApiConfig {
                api_key: env::var("ELSEVIER_API_KEY")
                    .context("ELSEVIER_API_KEY must be set")?,
                inst_token: env::var("ELSEVIER_INSTTOKEN").ok().filter(|t| !t.is_empty()),
                base_url: env::var("ELSEVIER_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                timeout_secs: env::var("ELSEVIER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("ELSEVIER_TIMEOUT_SECS must be a whole number of seconds")?,
            },
        })
    }
}
