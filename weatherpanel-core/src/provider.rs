use crate::{
    Config,
    model::{ForecastEntry, WeatherQuery, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and the short forecast.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> anyhow::Result<WeatherSnapshot>;

    /// Forecast entries, already cut to the forecast window.
    async fn forecast(&self, query: &WeatherQuery) -> anyhow::Result<Vec<ForecastEntry>>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.require_api_key()?;

    Ok(OpenWeatherProvider::new(
        api_key.to_owned(),
        config.endpoints.weather_base_url.clone(),
    ))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
