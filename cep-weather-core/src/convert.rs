//! Celsius conversions used in the outward response.

/// `c * 1.8 + 32`, unrounded.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 1.8 + 32.0
}

/// `c + 273`. The offset is 273, not 273.15; clients depend on it.
pub fn celsius_to_kelvin(c: f64) -> f64 {
    c + 273.0
}
