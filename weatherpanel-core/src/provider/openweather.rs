use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::model::{ForecastEntry, WeatherQuery, WeatherSnapshot, forecast_window};

use super::{WeatherProvider, truncate_body};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET `{base_url}/{endpoint}` with the query and API key, parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        label: &str,
        query: &WeatherQuery,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut params = query.query_pairs();
        params.push(("appid", self.api_key.clone()));

        debug!(%query, endpoint, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({label})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {label} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                label,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {label} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// Icon and description of the first weather condition, if any.
fn primary_condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.icon, w.description))
        .unwrap_or_else(|| (String::new(), "Unknown".to_string()))
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition_icon, condition_description) = primary_condition(parsed.weather);

        WeatherSnapshot {
            location_name: parsed.name,
            country_code: parsed.sys.country,
            timestamp_seconds: parsed.dt,
            temperature: parsed.main.temp,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            sunrise_seconds: parsed.sys.sunrise,
            sunset_seconds: parsed.sys.sunset,
            condition_icon,
            condition_description,
        }
    }
}

impl From<OwForecastEntry> for ForecastEntry {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition_icon, condition_description) = primary_condition(entry.weather);

        ForecastEntry {
            timestamp_text: entry.dt_txt,
            condition_icon,
            condition_description,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot> {
        let parsed: OwCurrentResponse = self.get_json("weather", "current", query).await?;
        Ok(parsed.into())
    }

    async fn forecast(&self, query: &WeatherQuery) -> Result<Vec<ForecastEntry>> {
        let parsed: OwForecastResponse = self.get_json("forecast", "forecast", query).await?;
        let entries = parsed.list.into_iter().map(ForecastEntry::from).collect();
        Ok(forecast_window(entries))
    }
}
