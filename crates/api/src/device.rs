//! Request-to-[`DeviceContext`] resolution from HTTP headers.
//!
//! Geolocation is whatever an edge proxy put in `CF-IPCountry` / `X-Geo-City`;
//! no IP database lookup is done here.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tessera_core::device::{DeviceContext, DeviceResolver, LocationCapture, RequestMeta, LOCAL, UNKNOWN};

const UNKNOWN_BROWSER: &str = "Unknown Browser";
const UNKNOWN_OS: &str = "Unknown OS";
const DESKTOP: &str = "Desktop";

/// Fallback when neither a forwarded address nor a peer address is known.
const FALLBACK_IP: &str = "0.0.0.0";

/// Browser markers, checked in order. Several browsers also advertise
/// `Chrome/` or `Safari/`, so the more specific tokens come first.
const BROWSERS: &[(&str, &str)] = &[
    ("Edg/", "Edge"),
    ("OPR/", "Opera"),
    ("Firefox/", "Firefox"),
    ("Chrome/", "Chrome"),
    ("Version/", "Safari"),
];

/// OS markers, checked in order.
const OPERATING_SYSTEMS: &[(&str, &str)] = &[
    ("Windows", "Windows"),
    ("iPhone", "iOS"),
    ("iPad", "iOS"),
    ("Android", "Android"),
    ("Mac OS X", "macOS"),
    ("CrOS", "Chrome OS"),
    ("Linux", "Linux"),
];

/// Device markers, checked in order.
const DEVICES: &[(&str, &str)] = &[
    ("iPhone", "Apple iPhone"),
    ("iPad", "Apple iPad"),
    ("Mobile", "Mobile"),
    ("Android", "Tablet"),
];

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves devices from headers set by the client and the edge proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDeviceResolver;

impl DeviceResolver for HeaderDeviceResolver {
    fn resolve(&self, request: &RequestMeta, location: LocationCapture) -> DeviceContext {
        let ip_address = client_ip(request);
        let (country, city) = if is_local_address(&ip_address) {
            (LOCAL.to_string(), LOCAL.to_string())
        } else {
            (
                non_empty(request.country_hint.as_deref()).unwrap_or(UNKNOWN).to_string(),
                non_empty(request.city_hint.as_deref()).unwrap_or(UNKNOWN).to_string(),
            )
        };

        let user_agent = non_empty(request.user_agent.as_deref());
        let agent = user_agent.unwrap_or_default();

        let mut device = DeviceContext::from_ip(ip_address).with_location(location);
        device.browser = parse_browser(agent);
        device.os = parse_os(agent);
        device.device_name = parse_device_name(agent);
        device.user_agent = user_agent.map(str::to_string);
        device.country = country;
        device.city = city;
        device
    }
}

/// First `X-Forwarded-For` entry, else the peer address, else `0.0.0.0`.
pub fn client_ip(request: &RequestMeta) -> String {
    request
        .forwarded_for
        .as_deref()
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| request.peer_ip.map(|ip| ip.to_string()))
        .unwrap_or_else(|| FALLBACK_IP.to_string())
}

/// Loopback and private-range addresses have no meaningful location.
pub fn is_local_address(ip: &str) -> bool {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private() || v4.is_unspecified(),
        Ok(IpAddr::V6(v6)) => {
            v6.is_loopback() || v6.is_unspecified() || (v6.segments()[0] & 0xfe00) == 0xfc00
        }
        Err(_) => false,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// User-agent classification
// ---------------------------------------------------------------------------

pub fn parse_browser(user_agent: &str) -> String {
    BROWSERS
        .iter()
        .find(|(marker, _)| user_agent.contains(marker))
        .map(|(marker, name)| match major_version(user_agent, marker) {
            Some(version) => format!("{name} {version}"),
            None => name.to_string(),
        })
        .unwrap_or_else(|| UNKNOWN_BROWSER.to_string())
}

pub fn parse_os(user_agent: &str) -> String {
    OPERATING_SYSTEMS
        .iter()
        .find(|(marker, _)| user_agent.contains(marker))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| UNKNOWN_OS.to_string())
}

pub fn parse_device_name(user_agent: &str) -> String {
    DEVICES
        .iter()
        .find(|(marker, _)| user_agent.contains(marker))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| DESKTOP.to_string())
}

/// Digits following `marker`, up to the first dot.
fn major_version<'a>(user_agent: &'a str, marker: &str) -> Option<&'a str> {
    let start = user_agent.find(marker)? + marker.len();
    let rest = &user_agent[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Raw device facts of the current request.
///
/// The peer address is only present when the server was started with
/// `into_make_service_with_connect_info`.
#[derive(Debug, Clone)]
pub struct ClientMeta(pub RequestMeta);

impl<S: Send + Sync> FromRequestParts<S> for ClientMeta {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(ClientMeta(request_meta(&parts.headers, peer_ip)))
    }
}

/// Collect the headers a [`DeviceResolver`] reads.
pub fn request_meta(headers: &HeaderMap, peer_ip: Option<IpAddr>) -> RequestMeta {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    RequestMeta {
        forwarded_for: header("x-forwarded-for"),
        peer_ip,
        user_agent: header("user-agent"),
        country_hint: header("cf-ipcountry"),
        city_hint: header("x-geo-city"),
    }
}
