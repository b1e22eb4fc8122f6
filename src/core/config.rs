//! Layered service configuration
//!
//! Sources, lowest priority first:
//! 1. built-in defaults (the `Default` impls below)
//! 2. TOML file (`jobs-bot.toml` or the `--config` path), optional
//! 3. `JOBS_BOT_*` environment variables, nested keys split on `__`
//!    (e.g. `JOBS_BOT_WEB__PORT=8080`)
//! 4. `TELOXIDE_TOKEN` / `BOT_TOKEN` for the bot token

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use secrecy::SecretString;
use serde::Deserialize;

use crate::core::error::{AppError, AppResult};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "jobs-bot.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "JOBS_BOT_";

/// Price of publishing one review, in Telegram Stars
pub const REVIEW_PRICE_STARS: u32 = 1;

/// Telegram Stars currency code
pub const STARS_CURRENCY: &str = "XTR";

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Bot credential. Also the root of the Mini App signature secret.
    pub bot_token: SecretString,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Maximum age of Mini App init data in seconds, 0 disables the check
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Custom Bot API server (local `telegram-bot-api`), if any
    pub api_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Mini App opened by the /start button; no button when unset
    pub webapp_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
    /// Mirror log output into this file
    pub file: Option<PathBuf>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("jobs-bot.sqlite")
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            cors_origins: vec![
                "https://jobs-iota-one.vercel.app".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { max_age_secs: 86_400 }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: 30,
            webapp_url: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Builds the provider stack without extracting it.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);

        Figment::new()
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["TELOXIDE_TOKEN"]).map(|_| "bot_token".into()))
            .merge(Env::raw().only(&["BOT_TOKEN"]))
    }

    /// Loads and validates the configuration.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config: Config = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        use secrecy::ExposeSecret;

        if self.bot_token.expose_secret().trim().is_empty() {
            return Err(AppError::Validation("bot_token must not be empty".to_string()));
        }
        if self.web.port == 0 {
            return Err(AppError::Validation("web.port must not be 0".to_string()));
        }
        Ok(())
    }
}

impl WebConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_secs > 0).then(|| Duration::from_secs(self.max_age_secs))
    }
}

impl BotConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
