use serde::{Deserialize, Serialize};

use crate::convert::{celsius_to_fahrenheit, celsius_to_kelvin};

/// Address returned by the postal lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostalAddress {
    pub locality: String,
    /// Two-letter state abbreviation, e.g. "SP".
    pub state: String,
    /// Set when the upstream service has no match for the code.
    pub not_found: bool,
}

/// Coordinates of a geocoded place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    pub state: String,
}

/// A collaborator answer: the decoded value plus the upstream HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: u16,
    pub value: T,
}

impl<T> Reply<T> {
    pub fn new(status: u16, value: T) -> Self {
        Self { status, value }
    }

    /// Upstream status signals failure (4xx/5xx).
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Temperature in the three scales served by `/api/weather`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

impl WeatherResponse {
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            temp_c: celsius,
            temp_f: celsius_to_fahrenheit(celsius),
            temp_k: celsius_to_kelvin(celsius),
        }
    }
}
