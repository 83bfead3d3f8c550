//! Runs panel effects as tokio tasks and feeds their completions back.
//!
//! Every effect becomes one or two tasks in a [`JoinSet`], each resolving to
//! exactly one [`PanelEvent`]. A task that panics still resolves its request
//! with a failure event. The panel itself is only touched by whoever owns the
//! driver, so all state changes happen on one task.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Result, anyhow};
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, warn};

use crate::{
    Config,
    countries::{CountriesNowClient, CountrySource},
    location::{LocationError, LocationService, location_from_config},
    model::WeatherQuery,
    panel::{Effect, PanelError, PanelEvent, RequestSeq, WeatherPanel},
    provider::{WeatherProvider, provider_from_config},
};

/// Remote collaborators of the panel.
#[derive(Debug, Clone)]
pub struct Services {
    pub weather: Arc<dyn WeatherProvider>,
    pub countries: Arc<dyn CountrySource>,
    pub location: Arc<dyn LocationService>,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            weather: Arc::new(provider_from_config(config)?),
            countries: Arc::new(CountriesNowClient::new(config.endpoints.countries_url.clone())),
            location: Arc::from(location_from_config(config)),
        })
    }
}

/// What a spawned task was fetching.
#[derive(Debug, Clone, Copy)]
enum Request {
    Position,
    Countries,
    Current(RequestSeq),
    Forecast(RequestSeq),
}

impl Request {
    /// Completion reported when the task died before producing one.
    fn failed(self, err: &JoinError) -> PanelEvent {
        let reason = format!("request task did not complete: {err}");
        match self {
            Request::Position => PanelEvent::PositionResolved(Err(LocationError::Other(reason))),
            Request::Countries => PanelEvent::CountriesLoaded(Err(anyhow!(reason))),
            Request::Current(seq) => PanelEvent::CurrentLoaded {
                seq,
                result: Err(anyhow!(reason)),
            },
            Request::Forecast(seq) => PanelEvent::ForecastLoaded {
                seq,
                result: Err(anyhow!(reason)),
            },
        }
    }
}

#[derive(Debug)]
pub struct PanelDriver {
    panel: WeatherPanel,
    services: Services,
    tasks: JoinSet<PanelEvent>,
    requests: HashMap<Id, Request>,
}

impl PanelDriver {
    pub fn new(panel: WeatherPanel, services: Services) -> Self {
        Self {
            panel,
            services,
            tasks: JoinSet::new(),
            requests: HashMap::new(),
        }
    }

    pub fn panel(&self) -> &WeatherPanel {
        &self.panel
    }

    /// Number of spawned requests whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn mount(&mut self) {
        let effects = self.panel.mount();
        self.dispatch(effects);
    }

    pub fn select_country(&mut self, country: &str) -> Result<(), PanelError> {
        self.panel.on_country_change(country)
    }

    pub fn select_city(&mut self, city: &str) -> Result<(), PanelError> {
        let effects = self.panel.on_city_change(city)?;
        self.dispatch(effects);
        Ok(())
    }

    /// Fetch weather for an arbitrary query, bypassing the selectors.
    pub fn fetch(&mut self, query: WeatherQuery) {
        let effect = self.panel.request(query);
        self.dispatch(vec![effect]);
    }

    /// Wait for one completion and apply it. Returns `false` when nothing is
    /// in flight.
    pub async fn next_event(&mut self) -> bool {
        let Some(joined) = self.tasks.join_next_with_id().await else {
            return false;
        };

        let event = match joined {
            Ok((id, event)) => {
                self.requests.remove(&id);
                event
            }
            Err(err) => {
                let request = self.requests.remove(&err.id());
                warn!(error = %err, ?request, "request task failed");
                match request {
                    Some(request) => request.failed(&err),
                    None => return true,
                }
            }
        };

        let follow_ups = self.panel.apply(event);
        self.dispatch(follow_ups);
        true
    }

    /// Apply completions until no request is in flight.
    pub async fn run_until_idle(&mut self) {
        while self.next_event().await {}
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            debug!(?effect, "dispatching");
            match effect {
                Effect::LocateDevice => {
                    let location = Arc::clone(&self.services.location);
                    self.spawn(Request::Position, async move {
                        PanelEvent::PositionResolved(location.current_position().await)
                    });
                }
                Effect::LoadCountries => {
                    let countries = Arc::clone(&self.services.countries);
                    self.spawn(Request::Countries, async move {
                        PanelEvent::CountriesLoaded(countries.fetch_countries().await)
                    });
                }
                Effect::FetchWeather { seq, query } => {
                    let weather = Arc::clone(&self.services.weather);
                    let current_query = query.clone();
                    self.spawn(Request::Current(seq), async move {
                        let result = weather.current(&current_query).await;
                        PanelEvent::CurrentLoaded { seq, result }
                    });

                    let weather = Arc::clone(&self.services.weather);
                    self.spawn(Request::Forecast(seq), async move {
                        let result = weather.forecast(&query).await;
                        PanelEvent::ForecastLoaded { seq, result }
                    });
                }
            }
        }
    }

    fn spawn<F>(&mut self, request: Request, task: F)
    where
        F: Future<Output = PanelEvent> + Send + 'static,
    {
        let handle = self.tasks.spawn(task);
        self.requests.insert(handle.id(), request);
    }
}
