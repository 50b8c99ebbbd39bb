//! IP-based geolocation, resolved once on a background thread.

use crate::globe::projection::GeoPoint;
use serde::Deserialize;
use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// Greenwich, used whenever the lookup fails.
pub const FALLBACK: GeoPoint = GeoPoint {
    lat: 51.4779,
    lon: -0.0015,
};

// ip-api's free tier is plain HTTP; coarse coordinates are all we need.
const ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";
const TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub enum GeolocateError {
    Request(String),
    Service(String),
    Malformed,
}

impl fmt::Display for GeolocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocateError::Request(e) => write!(f, "request failed: {}", e),
            GeolocateError::Service(msg) => write!(f, "service refused: {}", msg),
            GeolocateError::Malformed => write!(f, "malformed response"),
        }
    }
}

#[derive(Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Kick off the lookup without blocking the render loop; exactly one
/// result arrives on the returned channel.
pub fn spawn() -> Receiver<Result<GeoPoint, GeolocateError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(lookup());
    });
    rx
}

fn lookup() -> Result<GeoPoint, GeolocateError> {
    let resp = ureq::get(ENDPOINT)
        .timeout(TIMEOUT)
        .call()
        .map_err(|e| GeolocateError::Request(e.to_string()))?;
    let body: IpApiResponse = resp
        .into_json()
        .map_err(|e| GeolocateError::Request(e.to_string()))?;
    if body.status != "success" {
        let msg = body.message.unwrap_or_else(|| "no reason given".to_string());
        return Err(GeolocateError::Service(msg));
    }
    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => Ok(GeoPoint::new(lat, lon)),
        _ => Err(GeolocateError::Malformed),
    }
}
