//! Geographic coordinates.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static DECIMAL_RE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^[+-]?\d{1,3}(\.\d+)?$").expect("valid regex"));

/// A point with WGS84 latitude and longitude.
pub trait SpatialPoint {
    /// Latitude as sent to the provider.
    fn spatial_lat(&self) -> &str;
    /// Longitude as sent to the provider.
    fn spatial_lng(&self) -> &str;
}

/// A validated latitude/longitude pair.
///
/// The original decimal text is kept so coordinates are sent exactly as
/// given (e.g. `"37.55510690"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LatLng {
    lat: String,
    lng: String,
}

impl LatLng {
    /// Validate and create a coordinate pair.
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Result<Self> {
        let lat = parse_component("latitude", lat.into(), 90.0)?;
        let lng = parse_component("longitude", lng.into(), 180.0)?;
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> &str {
        &self.lat
    }

    pub fn lng(&self) -> &str {
        &self.lng
    }

    pub fn lat_f64(&self) -> f64 {
        self.lat.parse().unwrap_or_default()
    }

    pub fn lng_f64(&self) -> f64 {
        self.lng.parse().unwrap_or_default()
    }
}

impl SpatialPoint for LatLng {
    fn spatial_lat(&self) -> &str {
        &self.lat
    }

    fn spatial_lng(&self) -> &str {
        &self.lng
    }
}

impl FromStr for LatLng {
    type Err = Error;

    /// Parse `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| Error::validation(format!("Expected 'lat,lng', got '{}'", s)))?;
        Self::new(lat, lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

fn parse_component(name: &str, raw: String, limit: f64) -> Result<String> {
    let text = raw.trim();
    if !DECIMAL_RE.is_match(text) {
        return Err(Error::validation(format!(
            "Invalid {}: '{}' is not a decimal number",
            name, raw
        )));
    }
    let value: f64 = text
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {}: '{}'", name, raw)))?;
    if !(-limit..=limit).contains(&value) {
        return Err(Error::validation(format!(
            "Invalid {}: {} is outside [-{}, {}]",
            name, value, limit, limit
        )));
    }
    Ok(text.to_string())
}
