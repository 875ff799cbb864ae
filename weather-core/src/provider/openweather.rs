use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    config::{Config, WeatherSettings},
    error::WeatherError,
};

use super::WeatherProvider;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    settings: WeatherSettings,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, settings: WeatherSettings) -> Self {
        Self {
            api_key,
            settings,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.credentials.api_key.clone(),
            config.settings.weather.clone(),
        )
    }

    fn request_failed(&self, city: &str, err: reqwest::Error) -> WeatherError {
        WeatherError::RequestFailed {
            endpoint: self.settings.base_url.clone(),
            city: city.to_string(),
            source: err.without_url(),
        }
    }
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current_weather(&self, city: &str) -> Result<Value, WeatherError> {
        debug!(endpoint = %self.settings.base_url, "Requesting current weather");

        let res = self
            .http
            .get(&self.settings.base_url)
            .query(&[
                ("q", city),
                ("lang", self.settings.lang.as_str()),
                ("units", self.settings.units.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| self.request_failed(city, err))?;

        let status = res.status();
        if status != StatusCode::OK {
            warn!(%status, "OpenWeather answered with a non-200 status");
            return Err(WeatherError::CityNotFound {
                city: city.to_string(),
                status: status.as_u16(),
            });
        }

        let body = res
            .text()
            .await
            .map_err(|err| self.request_failed(city, err))?;

        serde_json::from_str(&body).map_err(WeatherError::Decode)
    }
}
