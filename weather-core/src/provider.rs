use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::WeatherError;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current weather observations.
///
/// Returns the decoded JSON body untouched; shape checks happen in
/// [`crate::validate`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<Value, WeatherError>;
}
