//! Read-only projection of the panel for renderers.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::{
    model::{ForecastEntry, WeatherSnapshot},
    panel::{Selection, WeatherPanel},
};

const DATE_FORMAT: &str = "%A, %B %-d";
const TIME_FORMAT: &str = "%-I:%M:%S %p";

pub fn icon_url(icon: &str) -> String {
    format!("http://openweathermap.org/img/w/{icon}.png")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotView {
    /// "Name, CC"
    pub title: String,
    pub date: String,
    pub temperature: f64,
    pub high: f64,
    pub low: f64,
    pub wind_speed: f64,
    pub humidity: u8,
    pub sunrise: String,
    pub sunset: String,
    pub icon_url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastCard {
    pub timestamp_text: String,
    pub icon_url: String,
    pub description: String,
    /// Taken from the current snapshot, not from the forecast entry.
    pub high: Option<f64>,
    pub low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewBody {
    Loading,
    Empty,
    Snapshot(SnapshotView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub country_options: Vec<String>,
    pub city_options: Vec<String>,
    pub city_selector_enabled: bool,
    pub selection: Selection,
    pub body: ViewBody,
    /// `None` while loading or when no forecast has been loaded.
    pub forecast: Option<Vec<ForecastCard>>,
}

impl ViewModel {
    /// Project the panel, formatting times in `tz`.
    pub fn derive<Tz: TimeZone>(panel: &WeatherPanel, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let snapshot = panel.snapshot();

        let body = match (panel.is_loading(), snapshot) {
            (true, _) => ViewBody::Loading,
            (false, None) => ViewBody::Empty,
            (false, Some(snapshot)) => ViewBody::Snapshot(snapshot_view(snapshot, tz)),
        };

        let forecast = if panel.is_loading() || panel.forecast().is_empty() {
            None
        } else {
            Some(
                panel
                    .forecast()
                    .iter()
                    .map(|entry| forecast_card(entry, snapshot))
                    .collect(),
            )
        };

        ViewModel {
            country_options: panel.country_options().map(str::to_string).collect(),
            city_options: panel.cities().to_vec(),
            city_selector_enabled: panel.city_selector_enabled(),
            selection: panel.selection().clone(),
            body,
            forecast,
        }
    }
}

fn snapshot_view<Tz: TimeZone>(snapshot: &WeatherSnapshot, tz: &Tz) -> SnapshotView
where
    Tz::Offset: std::fmt::Display,
{
    SnapshotView {
        title: format!("{}, {}", snapshot.location_name, snapshot.country_code),
        date: format_local(snapshot.timestamp_seconds, tz, DATE_FORMAT),
        temperature: snapshot.temperature,
        high: snapshot.temp_max,
        low: snapshot.temp_min,
        wind_speed: snapshot.wind_speed,
        humidity: snapshot.humidity,
        sunrise: format_local(snapshot.sunrise_seconds, tz, TIME_FORMAT),
        sunset: format_local(snapshot.sunset_seconds, tz, TIME_FORMAT),
        icon_url: icon_url(&snapshot.condition_icon),
        description: snapshot.condition_description.clone(),
    }
}

fn forecast_card(entry: &ForecastEntry, snapshot: Option<&WeatherSnapshot>) -> ForecastCard {
    ForecastCard {
        timestamp_text: entry.timestamp_text.clone(),
        icon_url: icon_url(&entry.condition_icon),
        description: entry.condition_description.clone(),
        high: snapshot.map(|s| s.temp_max),
        low: snapshot.map(|s| s.temp_min),
    }
}

fn format_local<Tz: TimeZone>(seconds: i64, tz: &Tz, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(seconds, 0) {
        Some(utc) => utc.with_timezone(tz).format(format).to_string(),
        None => "Invalid Date".to_string(),
    }
}
