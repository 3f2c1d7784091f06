//! Coarse location heuristics for flagging unfamiliar logins.
//!
//! A login is compared against the countries and IP ranges the account has
//! previously logged in from. Accounts with no baseline are never flagged;
//! their first login establishes it.

use crate::device::{is_sentinel_country, same_ip_range, DeviceContext};
use crate::store::{KnownLocationUpdate, UserSecurity};

/// Classification of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAssessment {
    Trusted,
    Suspicious { reason: String },
}

impl LoginAssessment {
    pub fn is_suspicious(&self) -> bool {
        matches!(self, LoginAssessment::Suspicious { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            LoginAssessment::Trusted => None,
            LoginAssessment::Suspicious { reason } => Some(reason),
        }
    }
}

/// Stateless classifier over a user's known-location sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspiciousLoginDetector;

impl SuspiciousLoginDetector {
    /// Classify a login from `device` for a user with the given baseline.
    pub fn assess(&self, user: &UserSecurity, device: &DeviceContext) -> LoginAssessment {
        if user.known_countries.is_empty() && user.known_ips.is_empty() {
            return LoginAssessment::Trusted;
        }

        let country = device.country.as_str();
        if !is_sentinel_country(country)
            && !user.known_countries.is_empty()
            && !user.known_countries.iter().any(|c| c == country)
        {
            return LoginAssessment::Suspicious {
                reason: format!("new country: {country}"),
            };
        }

        if !device.ip_address.is_empty()
            && !user.known_ips.is_empty()
            && !known_range(user, &device.ip_address)
        {
            return LoginAssessment::Suspicious {
                reason: format!("new IP range: {}", device.ip_address),
            };
        }

        LoginAssessment::Trusted
    }

    /// Baseline additions for a login that was *not* flagged.
    ///
    /// The country is added unless it is a sentinel or already known; the IP
    /// is added only when its range is not already represented.
    pub fn baseline_update(&self, user: &UserSecurity, device: &DeviceContext) -> KnownLocationUpdate {
        let add_country = (!is_sentinel_country(&device.country)
            && !user.known_countries.iter().any(|c| c == &device.country))
        .then(|| device.country.clone());

        let add_ip = (!device.ip_address.is_empty() && !known_range(user, &device.ip_address))
            .then(|| device.ip_address.clone());

        KnownLocationUpdate {
            add_country,
            add_ip,
        }
    }
}

fn known_range(user: &UserSecurity, ip: &str) -> bool {
    user.known_ips.iter().any(|known| same_ip_range(known, ip))
}
