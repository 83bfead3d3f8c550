//! Panel state: reference data, the country/city selection, and the
//! bookkeeping around weather fetches.
//!
//! The panel never performs I/O. Interactions return [`Effect`]s for the
//! caller to execute, and completions come back as [`PanelEvent`]s through
//! [`WeatherPanel::apply`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    location::LocationError,
    model::{Coordinates, CountryEntry, ForecastEntry, Units, WeatherQuery, WeatherSnapshot},
};

/// Sequence number stamped on every weather fetch.
pub type RequestSeq = u64;

/// How responses to superseded fetches are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchPolicy {
    /// Only responses to the newest fetch are applied.
    #[default]
    LatestRequest,
    /// Every response is applied as it arrives; the last one to land wins.
    LastResponse,
}

/// Side effects requested by the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LocateDevice,
    LoadCountries,
    /// Current conditions and forecast, issued together.
    FetchWeather { seq: RequestSeq, query: WeatherQuery },
}

/// Completion of an effect.
#[derive(Debug)]
pub enum PanelEvent {
    CountriesLoaded(anyhow::Result<Vec<CountryEntry>>),
    PositionResolved(Result<Coordinates, LocationError>),
    CurrentLoaded {
        seq: RequestSeq,
        result: anyhow::Result<WeatherSnapshot>,
    },
    ForecastLoaded {
        seq: RequestSeq,
        result: anyhow::Result<Vec<ForecastEntry>>,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("Country '{0}' is not in the loaded country list")]
    UnknownCountry(String),
    #[error("City selection is disabled until a country is selected")]
    CitySelectorDisabled,
}

/// The user's current choice. Empty strings mean "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub country: String,
    pub city: String,
}

#[derive(Debug, Default)]
pub struct WeatherPanel {
    policy: FetchPolicy,
    position_units: Option<Units>,
    mounted: bool,

    countries: Vec<CountryEntry>,
    selection: Selection,
    cities: Vec<String>,

    snapshot: Option<WeatherSnapshot>,
    forecast: Vec<ForecastEntry>,
    loading: bool,

    last_seq: Option<RequestSeq>,
    /// Set once the user has picked a city.
    city_chosen: bool,
}

impl WeatherPanel {
    pub fn new(policy: FetchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Units sent with the startup fetch for the device position.
    pub fn with_position_units(mut self, units: Option<Units>) -> Self {
        self.position_units = units;
        self
    }

    /// Startup actions. Only the first call has any effect.
    pub fn mount(&mut self) -> Vec<Effect> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        vec![Effect::LocateDevice, Effect::LoadCountries]
    }

    pub fn on_country_change(&mut self, country: &str) -> Result<(), PanelError> {
        let entry = self
            .countries
            .iter()
            .find(|c| c.country == country)
            .ok_or_else(|| PanelError::UnknownCountry(country.to_string()))?;

        self.cities = entry.cities.clone();
        self.selection.country = country.to_string();
        Ok(())
    }

    pub fn on_city_change(&mut self, city: &str) -> Result<Vec<Effect>, PanelError> {
        if !self.city_selector_enabled() {
            return Err(PanelError::CitySelectorDisabled);
        }

        self.selection.city = city.to_string();
        self.city_chosen = true;
        Ok(vec![self.request(WeatherQuery::city(city))])
    }

    /// Start a weather fetch for `query`: raises the loading flag and
    /// stamps the request with a fresh sequence number.
    pub fn request(&mut self, query: WeatherQuery) -> Effect {
        let seq = self.last_seq.map_or(0, |s| s + 1);
        self.last_seq = Some(seq);
        self.loading = true;

        info!(seq, %query, "fetching weather");
        Effect::FetchWeather { seq, query }
    }

    /// Fold a completion into the state. May return follow-up effects.
    pub fn apply(&mut self, event: PanelEvent) -> Vec<Effect> {
        match event {
            PanelEvent::CountriesLoaded(Ok(countries)) => {
                debug!(count = countries.len(), "country list loaded");
                self.countries = countries;
            }
            PanelEvent::CountriesLoaded(Err(err)) => {
                warn!(error = %format!("{err:#}"), "failed to load country list");
            }
            PanelEvent::PositionResolved(Ok(position)) => {
                if self.policy == FetchPolicy::LatestRequest && self.city_chosen {
                    debug!(?position, "city already chosen, ignoring device position");
                    return Vec::new();
                }
                let query = WeatherQuery::position(position, self.position_units);
                return vec![self.request(query)];
            }
            PanelEvent::PositionResolved(Err(err)) if err.is_refusal() => {
                debug!("device position not permitted");
            }
            PanelEvent::PositionResolved(Err(err)) => {
                warn!(error = %err, "device position unavailable");
            }
            PanelEvent::CurrentLoaded { seq, result } => {
                if !self.accepts(seq) {
                    debug!(seq, "discarding stale current conditions");
                    return Vec::new();
                }
                self.loading = false;
                match result {
                    Ok(snapshot) => self.snapshot = Some(snapshot),
                    Err(err) => {
                        warn!(seq, error = %format!("{err:#}"), "current conditions request failed")
                    }
                }
            }
            PanelEvent::ForecastLoaded { seq, result } => {
                if !self.accepts(seq) {
                    debug!(seq, "discarding stale forecast");
                    return Vec::new();
                }
                match result {
                    Ok(entries) => self.forecast = entries,
                    Err(err) => {
                        warn!(seq, error = %format!("{err:#}"), "forecast request failed")
                    }
                }
            }
        }
        Vec::new()
    }

    fn accepts(&self, seq: RequestSeq) -> bool {
        match self.policy {
            FetchPolicy::LastResponse => true,
            FetchPolicy::LatestRequest => self.last_seq == Some(seq),
        }
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    pub fn countries(&self) -> &[CountryEntry] {
        &self.countries
    }

    /// Country names offered by the country selector.
    pub fn country_options(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(|c| c.country.as_str())
    }

    /// Cities offered by the city selector.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn city_selector_enabled(&self) -> bool {
        !self.selection.country.is_empty()
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastEntry] {
        &self.forecast
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
