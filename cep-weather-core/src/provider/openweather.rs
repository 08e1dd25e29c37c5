use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ClientError,
    model::{GeoLocation, Reply},
    scope::RequestScope,
};

use super::{Geocoder, success_body};

const OPENWEATHER_BASE: &str = "http://api.openweathermap.org";

/// OpenWeatherMap direct geocoding.
#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherGeocoder {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            api_key,
            http,
            base_url: OPENWEATHER_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    async fn fetch(&self, query: &str) -> Result<Reply<Option<GeoLocation>>, ClientError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", "1"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let (status, body) = success_body(res).await?;

        let parsed: Vec<OwGeoEntry> = serde_json::from_str(&body)?;

        let first = parsed.into_iter().next().map(GeoLocation::from);

        Ok(Reply::new(status, first))
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    #[serde(default)]
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    state: String,
}

impl From<OwGeoEntry> for GeoLocation {
    fn from(e: OwGeoEntry) -> Self {
        GeoLocation {
            name: e.name,
            lat: e.lat,
            lon: e.lon,
            country: e.country,
            state: e.state,
        }
    }
}

fn geocode_query(locality: &str, country_code: &str) -> String {
    if country_code.is_empty() {
        locality.to_string()
    } else {
        format!("{locality},{country_code}")
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn geocode(
        &self,
        locality: &str,
        country_code: &str,
        scope: &RequestScope,
    ) -> Result<Reply<Option<GeoLocation>>, ClientError> {
        let query = geocode_query(locality, country_code);
        scope.run(self.fetch(&query)).await?
    }
}
