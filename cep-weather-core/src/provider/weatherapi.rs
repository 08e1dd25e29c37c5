use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::ClientError, model::Reply, scope::RequestScope};

use super::{TemperatureSource, success_body};

const WEATHERAPI_BASE: &str = "https://api.weatherapi.com";

/// WeatherAPI.com current conditions.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            api_key,
            http,
            base_url: WEATHERAPI_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<Reply<f64>, ClientError> {
        let url = format!("{}/v1/current.json", self.base_url);
        let q = format!("{lat:.6},{lon:.6}");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str())])
            .send()
            .await?;
        let (status, body) = success_body(res).await?;

        let parsed: WaResponse = serde_json::from_str(&body)?;

        Ok(Reply::new(status, parsed.current.temp_c))
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[async_trait]
impl TemperatureSource for WeatherApiClient {
    async fn current_temperature(
        &self,
        lat: f64,
        lon: f64,
        scope: &RequestScope,
    ) -> Result<Reply<f64>, ClientError> {
        scope.run(self.fetch_current(lat, lon)).await?
    }
}
