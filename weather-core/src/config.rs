use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::error;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "APIKEY";
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Environment variables the bot refuses to start without.
pub const TOKEN_NAMES: [&str; 3] = [API_KEY_VAR, BOT_TOKEN_VAR, CHAT_ID_VAR];

/// Reads a variable from the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Names of the required variables that are unset or blank.
pub fn missing_credentials<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_NAMES
        .into_iter()
        .filter(|name| lookup(*name).is_none_or(|value| value.trim().is_empty()))
        .collect()
}

/// Logs every missing credential and reports whether all of them are present.
pub fn check_tokens<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let missing = missing_credentials(lookup);
    log_missing(&missing);
    missing.is_empty()
}

fn log_missing(missing: &[&str]) {
    for name in missing {
        error!(variable = name, "Missing required environment variable {name}");
    }
}

/// The three secrets the bot runs with. Immutable once loaded.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    /// Build credentials from `lookup`, failing with every missing name at once.
    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing = missing_credentials(&lookup);
        if !missing.is_empty() {
            log_missing(&missing);
            return Err(ConfigError::MissingCredentials(missing));
        }

        let get = |name: &str| lookup(name).unwrap_or_default().trim().to_owned();

        Ok(Self {
            api_key: get(API_KEY_VAR),
            bot_token: get(BOT_TOKEN_VAR),
            chat_id: get(CHAT_ID_VAR),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(env_lookup)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// OpenWeather request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub base_url: String,
    pub lang: String,
    pub units: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: "http://api.openweathermap.org/data/2.5/weather".to_string(),
            lang: "ru".to_string(),
            units: "metric".to_string(),
        }
    }
}

/// Telegram Bot API endpoint and polling behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
    /// Sent to the configured chat once on startup.
    pub greeting: String,
}

impl TelegramSettings {
    /// Extra time a long-poll request gets before the HTTP client gives up on it.
    pub const REQUEST_GRACE: Duration = Duration::from_secs(5);

    /// HTTP timeout covering a full long-poll plus [`Self::REQUEST_GRACE`].
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs) + Self::REQUEST_GRACE
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            greeting: "Привет! Введи город - будет погода:)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Rotating log file; `None` logs to stdout only.
    pub file: Option<PathBuf>,
    pub max_bytes: u64,
    /// Number of rolled-over files kept next to the active one.
    pub max_files: usize,
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("weather-bot.log")),
            max_bytes: 50 * 1024 * 1024,
            max_files: 5,
            level: "info".to_string(),
        }
    }
}

/// Non-secret settings stored on disk.
///
/// Example TOML:
/// [weather]
/// lang = "en"
///
/// [log]
/// file = "/var/log/weather-bot.log"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub weather: WeatherSettings,
    pub telegram: TelegramSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Load settings from `path`, or from the platform config file when no path is given.
    ///
    /// An explicit path must exist; the platform file is optional and falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_file_path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Path to the platform config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-bot", "weather-bot")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Everything the bot needs, built once in `main` and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub settings: Settings,
}
