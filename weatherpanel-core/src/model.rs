use serde::{Deserialize, Serialize};

/// Number of provider forecast entries kept for display.
pub const FORECAST_WINDOW: usize = 7;

/// Unit system understood by the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kelvin, the provider default when no `units` parameter is sent.
    #[default]
    Standard,
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of the country/city reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub country: String,
    #[serde(default)]
    pub iso2: String,
    pub cities: Vec<String>,
}

/// What to ask the weather provider for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeatherQuery {
    Coordinates {
        position: Coordinates,
        units: Option<Units>,
    },
    City {
        name: String,
        units: Units,
    },
}

impl WeatherQuery {
    /// Query built when the user picks a city from the selector.
    pub fn city(name: impl Into<String>) -> Self {
        WeatherQuery::City {
            name: name.into(),
            units: Units::Metric,
        }
    }

    pub fn position(position: Coordinates, units: Option<Units>) -> Self {
        WeatherQuery::Coordinates { position, units }
    }

    /// Provider query parameters, without the API key.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            WeatherQuery::Coordinates { position, units } => {
                let mut pairs = vec![
                    ("lat", position.latitude.to_string()),
                    ("lon", position.longitude.to_string()),
                ];
                if let Some(units) = units {
                    pairs.push(("units", units.as_str().to_string()));
                }
                pairs
            }
            WeatherQuery::City { name, units } => {
                vec![("q", name.clone()), ("units", units.as_str().to_string())]
            }
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::Coordinates { position, .. } => {
                write!(f, "{:.4},{:.4}", position.latitude, position.longitude)
            }
            WeatherQuery::City { name, .. } => f.write_str(name),
        }
    }
}

/// Current conditions as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country_code: String,
    pub timestamp_seconds: i64,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub sunrise_seconds: i64,
    pub sunset_seconds: i64,
    pub condition_icon: String,
    pub condition_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp_text: String,
    pub condition_icon: String,
    pub condition_description: String,
}

/// Keep the first [`FORECAST_WINDOW`] entries in provider order.
pub fn forecast_window(mut entries: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    entries.truncate(FORECAST_WINDOW);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> ForecastEntry {
        ForecastEntry {
            timestamp_text: format!("2024-01-01 {:02}:00:00", i * 3),
            condition_icon: "01d".into(),
            condition_description: "clear sky".into(),
        }
    }

    #[test]
    fn forecast_window_keeps_first_seven_in_order() {
        let entries: Vec<_> = (0..10).map(entry).collect();
        let kept = forecast_window(entries.clone());

        assert_eq!(kept.len(), 7);
        assert_eq!(kept, entries[..7]);
    }

    #[test]
    fn forecast_window_keeps_short_lists_whole() {
        let entries: Vec<_> = (0..3).map(entry).collect();
        assert_eq!(forecast_window(entries.clone()), entries);
        assert!(forecast_window(Vec::new()).is_empty());
    }

    #[test]
    fn city_query_is_metric() {
        let q = WeatherQuery::city("Lagos");
        assert_eq!(
            q.query_pairs(),
            vec![("q", "Lagos".to_string()), ("units", "metric".to_string())]
        );
    }

    #[test]
    fn position_query_omits_units_unless_set() {
        let position = Coordinates {
            latitude: 6.5,
            longitude: 3.25,
        };

        let pairs = WeatherQuery::position(position, None).query_pairs();
        assert_eq!(pairs, vec![("lat", "6.5".to_string()), ("lon", "3.25".to_string())]);

        let pairs = WeatherQuery::position(position, Some(Units::Imperial)).query_pairs();
        assert_eq!(pairs.last(), Some(&("units", "imperial".to_string())));
    }
}
