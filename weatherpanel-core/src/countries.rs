//! Country/city reference list used to populate the selectors.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{model::CountryEntry, provider::truncate_body};

#[async_trait]
pub trait CountrySource: Send + Sync + Debug {
    async fn fetch_countries(&self) -> Result<Vec<CountryEntry>>;
}

/// Client for the countriesnow.space reference endpoint.
#[derive(Debug, Clone)]
pub struct CountriesNowClient {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct CountriesResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<CountryEntry>,
}

impl CountriesNowClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl CountrySource for CountriesNowClient {
    async fn fetch_countries(&self) -> Result<Vec<CountryEntry>> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Failed to send request for the country list")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read country list response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Country list request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: CountriesResponse =
            serde_json::from_str(&body).context("Failed to parse country list JSON")?;

        if parsed.error {
            return Err(anyhow!("Country list endpoint reported an error: {}", parsed.msg));
        }

        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_payload() {
        let json = r#"{
            "error": false,
            "msg": "countries and cities retrieved",
            "data": [
                {"iso2": "NG", "iso3": "NGA", "country": "Nigeria", "cities": ["Abuja", "Lagos"]},
                {"iso2": "GH", "iso3": "GHA", "country": "Ghana", "cities": []}
            ]
        }"#;

        let parsed: CountriesResponse = serde_json::from_str(json).expect("valid payload");
        assert!(!parsed.error);
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].country, "Nigeria");
        assert_eq!(parsed.data[0].iso2, "NG");
        assert_eq!(parsed.data[0].cities, vec!["Abuja", "Lagos"]);
        assert!(parsed.data[1].cities.is_empty());
    }
}
