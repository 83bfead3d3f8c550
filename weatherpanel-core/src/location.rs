//! Device location service: one-shot lookup of the current position.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{Config, model::Coordinates};

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    /// The user (or config) declined the lookup. Not a fault worth a warning.
    pub fn is_refusal(&self) -> bool {
        matches!(self, LocationError::PermissionDenied)
    }
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Always reports the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationService for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Stands in for a user who refuses the location prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocation;

#[async_trait]
impl LocationService for DisabledLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Approximate position from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl LocationService for IpLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let res = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Unavailable(e.to_string())
            }
        })?;

        if !res.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup failed with status {}",
                res.status()
            )));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("invalid lookup response: {e}")))?;

        parsed.into_coordinates()
    }
}

impl IpApiResponse {
    fn into_coordinates(self) -> Result<Coordinates, LocationError> {
        if self.status != "success" {
            return Err(LocationError::Unavailable(
                self.message.unwrap_or_else(|| self.status.clone()),
            ));
        }

        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(LocationError::Other("lookup response had no coordinates".into())),
        }
    }
}

/// Pick the location service described by config: fixed coordinates win,
/// then IP lookup if enabled, otherwise the request is always denied.
pub fn location_from_config(config: &Config) -> Box<dyn LocationService> {
    if let Some(position) = config.fixed_position() {
        return Box::new(FixedLocation(position));
    }

    if config.location.auto_detect {
        Box::new(IpLocation::new(config.endpoints.ip_location_url.clone()))
    } else {
        Box::new(DisabledLocation)
    }
}
