//! Core library for the `weatherpanel` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the weather provider, the country/city reference list and
//!   the device location service
//! - The panel state (selection, loading flag, last snapshot and forecast)
//! - A plain-data view model any renderer can consume
//! - An async driver that executes panel effects on tokio
//!
//! It is used by `weatherpanel-cli`, but can also back other front-ends.

pub mod config;
pub mod countries;
pub mod driver;
pub mod location;
pub mod model;
pub mod panel;
pub mod provider;
pub mod view;

pub use config::Config;
pub use countries::{CountriesNowClient, CountrySource};
pub use driver::{PanelDriver, Services};
pub use location::{LocationError, LocationService};
pub use model::{Coordinates, CountryEntry, ForecastEntry, Units, WeatherQuery, WeatherSnapshot};
pub use panel::{Effect, FetchPolicy, PanelError, PanelEvent, WeatherPanel};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use view::{ViewBody, ViewModel};
