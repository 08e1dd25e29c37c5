//! Core library for the CEP weather service.
//!
//! This crate defines:
//! - CEP validation and Celsius conversions
//! - The upstream collaborators (postal lookup, geocoding, temperature) and their HTTP clients
//! - The request scope bounding a lookup in time and cancellation
//! - The orchestration that chains the three lookups
//! - Configuration & credentials handling
//!
//! It is used by `cep-weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod provider;
pub mod scope;
pub mod service;
pub mod validate;

pub use config::{Config, ProviderConfig};
pub use error::{ClientError, LookupError};
pub use model::{GeoLocation, PostalAddress, Reply, WeatherResponse};
pub use provider::{Geocoder, PostalLookup, ProviderId, TemperatureSource};
pub use scope::{RequestScope, ScopeError};
pub use service::WeatherService;
pub use validate::is_valid_cep;
