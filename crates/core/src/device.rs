//! Device and network snapshot attached to each session.
//!
//! Turning a raw request into a [`DeviceContext`] (user-agent parsing, geo-IP)
//! is done by a [`DeviceResolver`] supplied by the caller.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Country/city value for loopback and private addresses.
pub const LOCAL: &str = "Local";
/// Country/city value when no location could be determined.
pub const UNKNOWN: &str = "Unknown";

/// How the location of a session was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    #[default]
    Ip,
    Gps,
}

impl LocationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationSource::Ip => "ip",
            LocationSource::Gps => "gps",
        }
    }

    /// Parse the persisted representation. Anything but `gps` is `ip`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "gps" => LocationSource::Gps,
            _ => LocationSource::Ip,
        }
    }
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied location for a single login or rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationCapture {
    /// Use whatever the resolver derived from the IP address.
    #[default]
    IpDerived,
    /// The client reported GPS coordinates; they apply to this session only.
    GpsProvided { latitude: f64, longitude: f64 },
}

impl LocationCapture {
    /// Build a capture from optional request coordinates. Both must be present.
    pub fn from_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => LocationCapture::GpsProvided {
                latitude,
                longitude,
            },
            _ => LocationCapture::IpDerived,
        }
    }
}

/// Snapshot of the client that presented credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceContext {
    pub device_name: String,
    pub browser: String,
    pub os: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub country: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_source: LocationSource,
}

impl DeviceContext {
    /// Context for an address with nothing else known about the client.
    pub fn from_ip(ip_address: impl Into<String>) -> Self {
        Self {
            device_name: "Unknown Device".to_string(),
            browser: "Unknown Browser".to_string(),
            os: "Unknown OS".to_string(),
            ip_address: ip_address.into(),
            user_agent: None,
            country: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            latitude: None,
            longitude: None,
            location_source: LocationSource::Ip,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Apply a location capture. GPS coordinates override the IP-derived source.
    pub fn with_location(mut self, capture: LocationCapture) -> Self {
        match capture {
            LocationCapture::IpDerived => {
                self.latitude = None;
                self.longitude = None;
                self.location_source = LocationSource::Ip;
            }
            LocationCapture::GpsProvided {
                latitude,
                longitude,
            } => {
                self.latitude = Some(latitude);
                self.longitude = Some(longitude);
                self.location_source = LocationSource::Gps;
            }
        }
        self
    }
}

/// Raw request facts a [`DeviceResolver`] works from.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Value of the `X-Forwarded-For` header, if any.
    pub forwarded_for: Option<String>,
    /// Socket peer address.
    pub peer_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    /// Country code supplied by an edge proxy.
    pub country_hint: Option<String>,
    /// City supplied by an edge proxy.
    pub city_hint: Option<String>,
}

/// Maps a raw request into a device/location descriptor.
pub trait DeviceResolver: Send + Sync {
    fn resolve(&self, request: &RequestMeta, location: LocationCapture) -> DeviceContext;
}

/// `Local` and `Unknown` never count as a real country.
pub fn is_sentinel_country(country: &str) -> bool {
    country.is_empty() || country == LOCAL || country == UNKNOWN
}

/// Whether two addresses belong to the same coarse network range.
///
/// IPv4 addresses compare on their first three octets (a /24). Anything that
/// is not a dotted quad compares by exact equality.
pub fn same_ip_range(a: &str, b: &str) -> bool {
    let parts_a: Vec<&str> = a.split('.').collect();
    let parts_b: Vec<&str> = b.split('.').collect();
    if parts_a.len() != 4 || parts_b.len() != 4 {
        return a == b;
    }
    parts_a[..3] == parts_b[..3]
}
