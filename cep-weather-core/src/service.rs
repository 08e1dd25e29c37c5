//! CEP → temperature orchestration.
//!
//! The three collaborators are called strictly in order, each under the same
//! [`RequestScope`]. Every upstream failure, whatever its cause, collapses
//! into [`LookupError::NotFound`]; the cause is only logged.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{ClientError, LookupError},
    model::{Reply, WeatherResponse},
    provider::{
        Geocoder, PostalLookup, ProviderId, TemperatureSource, http_client,
        openweather::OpenWeatherGeocoder, viacep::ViaCepClient, weatherapi::WeatherApiClient,
    },
    scope::RequestScope,
    validate::is_valid_cep,
};

/// Country passed to the geocoder; only Brazilian localities are resolved.
pub const COUNTRY_CODE: &str = "BR";

/// Budget shared by the three upstream calls of one lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct WeatherService {
    postal: Arc<dyn PostalLookup>,
    geocoder: Arc<dyn Geocoder>,
    thermometer: Arc<dyn TemperatureSource>,
    timeout: Duration,
}

impl WeatherService {
    pub fn new(
        postal: Arc<dyn PostalLookup>,
        geocoder: Arc<dyn Geocoder>,
        thermometer: Arc<dyn TemperatureSource>,
    ) -> Self {
        Self {
            postal,
            geocoder,
            thermometer,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wire the ViaCEP, OpenWeatherMap and WeatherAPI clients from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = http_client(config.http_timeout())?;

        let geo_key = config.require_api_key(ProviderId::OpenWeather)?;
        let weather_key = config.require_api_key(ProviderId::WeatherApi)?;

        Ok(Self::new(
            Arc::new(ViaCepClient::new(http.clone())),
            Arc::new(OpenWeatherGeocoder::new(http.clone(), geo_key.to_owned())),
            Arc::new(WeatherApiClient::new(http, weather_key.to_owned())),
        )
        .with_timeout(config.lookup_timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `cep` to its current temperature.
    ///
    /// Surrounding whitespace is ignored. The upstream calls are bounded by a
    /// scope derived from `parent` and released before this returns.
    #[instrument(skip(self, parent), level = "debug")]
    pub async fn current_weather(
        &self,
        cep: &str,
        parent: Option<&CancellationToken>,
    ) -> Result<WeatherResponse, LookupError> {
        let cep = cep.trim();
        if !is_valid_cep(cep) {
            return Err(LookupError::InvalidZipcode);
        }

        let scope = RequestScope::derive(parent, self.timeout);

        let address = settle("postal lookup", self.postal.lookup(cep, &scope).await)?
            .filter(|a| !a.not_found)
            .ok_or_else(|| miss("postal lookup"))?;

        let location = settle(
            "geocoding",
            self.geocoder
                .geocode(&address.locality, COUNTRY_CODE, &scope)
                .await,
        )?
        .ok_or_else(|| miss("geocoding"))?;

        let celsius = settle(
            "temperature lookup",
            self.thermometer
                .current_temperature(location.lat, location.lon, &scope)
                .await,
        )?;

        debug!(
            locality = %address.locality,
            state = %address.state,
            lat = location.lat,
            lon = location.lon,
            celsius,
            "resolved temperature"
        );

        Ok(WeatherResponse::from_celsius(celsius))
    }
}

/// Collapse a collaborator result: transport errors and error statuses both
/// become [`LookupError::NotFound`].
fn settle<T>(step: &str, result: Result<Reply<T>, ClientError>) -> Result<T, LookupError> {
    match result {
        Ok(reply) if reply.is_error_status() => {
            debug!(step, status = reply.status, "upstream returned error status");
            Err(LookupError::NotFound)
        }
        Ok(reply) => Ok(reply.value),
        Err(e) => {
            debug!(step, error = %e, "upstream call failed");
            Err(LookupError::NotFound)
        }
    }
}

fn miss(step: &str) -> LookupError {
    debug!(step, "upstream has no match");
    LookupError::NotFound
}
