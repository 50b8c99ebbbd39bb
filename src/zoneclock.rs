//! Zone clock readout fed by the engine's timezone broadcast.
//!
//! Subscribes once and converts the latest offset into HUD lines: a local
//! wall clock and today's sunrise/sunset for the marker.

use crate::globe::engine::{GlobeEngine, TimezoneChange};
use crate::globe::projection::GeoPoint;
use chrono::{DateTime, Duration, Timelike, Utc};
use std::cell::Cell;
use std::rc::Rc;
use sunrise_sunset_calculator::SunriseSunsetParameters;

pub struct ZoneClock {
    offset_minutes: Rc<Cell<Option<i32>>>,
}

impl ZoneClock {
    /// Hook into the engine; every location change updates the offset.
    pub fn subscribe(engine: &mut GlobeEngine) -> Self {
        let shared = Rc::new(Cell::new(None));
        let sink = Rc::clone(&shared);
        engine.on_timezone_change(move |change: TimezoneChange| {
            sink.set(Some(change.offset_minutes));
        });
        ZoneClock {
            offset_minutes: shared,
        }
    }

    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset_minutes.get()
    }

    /// Wall clock line for the last received offset, if any.
    pub fn time_line(&self, now_utc: DateTime<Utc>) -> Option<String> {
        self.offset_minutes
            .get()
            .map(|offset| format_zone_time(now_utc, offset))
    }
}

/// "14:03:22 UTC+9" for a UTC instant shifted by whole minutes.
pub fn format_zone_time(now_utc: DateTime<Utc>, offset_minutes: i32) -> String {
    let shifted = now_utc + Duration::minutes(offset_minutes as i64);
    format!(
        "{:02}:{:02}:{:02} {}",
        shifted.hour(),
        shifted.minute(),
        shifted.second(),
        offset_tag(offset_minutes)
    )
}

fn offset_tag(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let hours = offset_minutes.abs() / 60;
    let minutes = offset_minutes.abs() % 60;
    if minutes == 0 {
        format!("UTC{}{}", sign, hours)
    } else {
        format!("UTC{}{}:{:02}", sign, hours, minutes)
    }
}

/// "up 04:43  down 20:21" sunrise/sunset at `geo` in zone-local time.
/// Polar edge cases from the calculator fall back to a 06:00/18:00 split.
pub fn sun_line(geo: GeoPoint, offset_minutes: i32, now_utc: DateTime<Utc>) -> String {
    match SunriseSunsetParameters::new(now_utc.timestamp(), geo.lat, geo.lon).calculate() {
        Ok(result) => format!(
            "\u{2191} {}  \u{2193} {}",
            zone_hhmm(result.rise, offset_minutes),
            zone_hhmm(result.set, offset_minutes)
        ),
        Err(_) => "\u{2191} 06:00  \u{2193} 18:00".to_string(),
    }
}

fn zone_hhmm(unix: i64, offset_minutes: i32) -> String {
    let utc = DateTime::from_timestamp(unix, 0).unwrap_or(DateTime::UNIX_EPOCH);
    let shifted = utc + Duration::minutes(offset_minutes as i64);
    format!("{:02}:{:02}", shifted.hour(), shifted.minute())
}
