//! Core library for the weather Telegram bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeather client
//! - Response validation, decoding and report formatting
//! - The Telegram gateway and the dispatch loop tying it all together
//!
//! It is used by `weather-bot`, but the pipeline can be driven by any caller.

pub mod bot;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod telegram;
pub mod validate;

pub use bot::{WeatherBot, weather_report};
pub use config::{Config, Credentials, LogSettings, Settings, TelegramSettings, WeatherSettings};
pub use error::{
    ConfigError, PipelineError, ReportError, SendError, ShapeError, TelegramError, WeatherError,
};
pub use model::{CompassPoint, Measure, WeatherReading};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use telegram::{Messenger, TelegramClient};
