//! Error types shared across the bot pipeline.
//!
//! Configuration errors are fatal and stop the process before polling starts.
//! Everything else is recoverable: the dispatch loop turns it into an
//! "Oops:" reply and keeps serving.

use std::path::PathBuf;

use thiserror::Error;

/// Longest echo of user input kept in an error message.
const CITY_PREVIEW: usize = 64;
/// Longest excerpt of an undelivered message kept in an error message.
const TEXT_PREVIEW: usize = 100;

/// First `max` characters of `s`, with `...` appended when cut.
pub(crate) fn preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Startup configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("could not determine platform config directory")]
    NoConfigDir,

    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures while talking to the weather provider.
///
/// Messages never carry the request query string, which holds the API key.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("API request failed: {endpoint} (city: {}): {source}", preview(city, CITY_PREVIEW))]
    RequestFailed {
        endpoint: String,
        city: String,
        #[source]
        source: reqwest::Error,
    },

    /// Every non-200 status lands here, not only 404.
    #[error("city not found: {} (status {status})", preview(city, CITY_PREVIEW))]
    CityNotFound { city: String, status: u16 },

    #[error("failed to decode weather response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The provider payload does not have the shape the formatter relies on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("wrong type: weather response is not a JSON object")]
    NotAMapping,

    #[error("missing key: `{0}` in weather response")]
    MissingKey(&'static str),

    #[error("wrong type: `weather` is not a list")]
    WeatherNotSequence,
}

/// Field-level failures while decoding a validated payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("missing key: `name` in weather response")]
    MissingCity,

    #[error("wrong type: `{field}` is not a number")]
    NotANumber { field: &'static str },
}

/// Transport or API-level failures of the Telegram Bot API.
///
/// The request URL embeds the bot token, so it is stripped from every error.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Telegram API error (status {status}): {description}")]
    Api { status: u16, description: String },

    #[error("failed to decode Telegram response: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
#[error(
    "failed to send message {:?} to chat {chat_id}: {source}",
    preview(text, TEXT_PREVIEW)
)]
pub struct SendError {
    pub chat_id: String,
    pub text: String,
    #[source]
    pub source: TelegramError,
}

/// Anything that can go wrong while answering one inbound message.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Send(#[from] SendError),
}
