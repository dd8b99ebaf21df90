use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reverse lookup failed.
pub const HOSTNAME_UNKNOWN: &str = "unknown";
/// Reverse lookup exceeded its time budget.
pub const HOSTNAME_TIMED_OUT: &str = "Timed Out!";
/// Geolocation request never produced a response.
pub const GEO_TIMED_OUT: &str = "Geoloc timed out";
/// Geolocation service answered with an error status or an undecodable body.
pub const GEO_FAILED: &str = "Geoloc failed";

/// Location record in the freegeoip layout. Absent or `null` fields decode
/// to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geodata {
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub zip_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub time_zone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub metro_code: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Geodata {
    /// Zero record carrying a failure marker in `hostname`.
    pub fn failed(marker: &str) -> Self {
        Self {
            hostname: marker.to_string(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Geodata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "*{} {} {} {}",
            self.country_name, self.region_name, self.city, self.zip_code
        )?;
        writeln!(
            f,
            "*{} (Lat/Long {} {}) Metro: {}",
            self.time_zone, self.latitude, self.longitude, self.metro_code
        )
    }
}

/// Enrichment result for one address.
///
/// Owned by whichever pipeline stage currently holds it; handed on by moving it
/// into the next channel.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedHost {
    pub address: String,
    pub hostname: String,
    pub geo: Option<Geodata>,
}

impl EnrichedHost {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: String::new(),
            geo: None,
        }
    }

    /// Reverse-DNS name, falling back to the name reported by the geolocation
    /// service when reverse DNS was not run.
    pub fn display_hostname(&self) -> &str {
        if !self.hostname.is_empty() {
            return &self.hostname;
        }
        self.geo.as_ref().map(|g| g.hostname.as_str()).unwrap_or_default()
    }
}
