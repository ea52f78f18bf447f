//! REST routes, response payloads and stale-response fencing.

use serde::{Deserialize, Serialize};

use crate::config::API_BASE;

const INFO_PREFIX: &str = "/api/infocommune";

/// Percent-encode a path segment the way `encodeURIComponent` does: every
/// UTF-8 byte outside `A-Z a-z 0-9 - _ . ! ~ * ' ( )` becomes `%XX`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn province_names_url() -> String {
    format!("{API_BASE}{INFO_PREFIX}/all_province_names")
}

pub fn commune_names_url() -> String {
    format!("{API_BASE}{INFO_PREFIX}/all_commune_names")
}

pub fn communes_url(province: &str) -> String {
    format!("{API_BASE}{INFO_PREFIX}/communes/{}", encode_uri_component(province))
}

pub fn province_summary_url(province: &str) -> String {
    format!("{API_BASE}{INFO_PREFIX}/province/{}", encode_uri_component(province))
}

pub fn province_geometry_url(province: &str) -> String {
    format!(
        "{API_BASE}{INFO_PREFIX}/province_geometry/{}",
        encode_uri_component(province)
    )
}

pub fn commune_geometry_url(province: &str, commune: &str) -> String {
    format!(
        "{API_BASE}{INFO_PREFIX}/commune_geometry/{}/{}",
        encode_uri_component(province),
        encode_uri_component(commune)
    )
}

pub fn elevation_url(lon: f64, lat: f64) -> String {
    format!("{API_BASE}/api/elevation?lat={lat}&lon={lon}")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationResponse {
    pub success: bool,
    pub elevation: Option<f64>,
}

impl ElevationResponse {
    /// Elevation in meters, only when the lookup reported success.
    pub fn meters(&self) -> Option<f64> {
        if self.success { self.elevation } else { None }
    }
}

/// Monotonic token source for one request purpose. A response is applied only
/// if the token it was issued with is still the latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFence {
    latest: u64,
}

impl RequestFence {
    pub fn issue(&mut self) -> u64 {
        self.latest = self.latest.wrapping_add(1);
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }

    /// Invalidate every outstanding token without starting a request.
    pub fn cancel(&mut self) {
        self.issue();
    }
}
