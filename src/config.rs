use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    /// Usually left out of the file and supplied through `BOT_TOKEN`
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Custom Bot API server, e.g. a local `telegram-bot-api` instance
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Reported by the status endpoint
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            platform: default_platform(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8787".to_string()
}

fn default_platform() -> String {
    "self-hosted".to_string()
}

impl TelegramConfig {
    /// The configured token, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn api_url(&self) -> Result<Option<reqwest::Url>> {
        self.api_url
            .as_deref()
            .map(|raw| {
                reqwest::Url::parse(raw)
                    .with_context(|| format!("Invalid telegram.api_url: {}", raw))
            })
            .transpose()
    }
}

impl Config {
    /// Read `path` if it exists; a missing file means all defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.telegram.api_url()?;
        Ok(config)
    }

    /// Overlay `BOT_TOKEN` and `LISTEN_ADDR` from the environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(addr) = lookup("LISTEN_ADDR").filter(|a| !a.trim().is_empty()) {
            self.server.listen_addr = addr;
        }
    }
}
