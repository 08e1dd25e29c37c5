use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{
    error::ClientError,
    model::{GeoLocation, PostalAddress, Reply},
    scope::RequestScope,
};

pub mod openweather;
pub mod viacep;
pub mod weatherapi;

/// Providers that need an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHERMAP_API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// Resolves a CEP to an address.
#[async_trait]
pub trait PostalLookup: Send + Sync + Debug {
    async fn lookup(
        &self,
        cep: &str,
        scope: &RequestScope,
    ) -> Result<Reply<Option<PostalAddress>>, ClientError>;
}

/// Resolves a locality name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(
        &self,
        locality: &str,
        country_code: &str,
        scope: &RequestScope,
    ) -> Result<Reply<Option<GeoLocation>>, ClientError>;
}

/// Current temperature in Celsius at a coordinate.
#[async_trait]
pub trait TemperatureSource: Send + Sync + Debug {
    async fn current_temperature(
        &self,
        lat: f64,
        lon: f64,
        scope: &RequestScope,
    ) -> Result<Reply<f64>, ClientError>;
}

/// HTTP client shared by all providers.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Read the response body, turning a non-2xx status into [`ClientError::Status`].
pub(crate) async fn success_body(res: reqwest::Response) -> Result<(u16, String), ClientError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    Ok((status.as_u16(), body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
