use cadence::{Location, Observation};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::api::Station;

/// Gauge name for regular bikes available at a station.
pub const GAUGE_AVAILABLE: &str = "available";
/// Gauge name for e-bikes available at a station.
pub const GAUGE_EBIKES: &str = "ebikes";
/// Gauge name for open docks at a station.
pub const GAUGE_EMPTY_SLOTS: &str = "empty_slots";

/// Transform one CityBikes station into a cadence observation.
///
/// Entity id: the network's stable `extra.uid` when present, otherwise
/// the per-response observation id. Missing gauges read as 0 and a
/// missing or malformed timestamp falls back to the fetch time.
pub fn station_to_observation(station: &Station) -> Observation {
    let id = station
        .extra
        .uid
        .clone()
        .unwrap_or_else(|| station.id.clone());

    let gauges = HashMap::from([
        (GAUGE_AVAILABLE.to_string(), station.free_bikes.unwrap_or(0)),
        (GAUGE_EBIKES.to_string(), station.extra.ebikes.unwrap_or(0)),
        (
            GAUGE_EMPTY_SLOTS.to_string(),
            station.empty_slots.unwrap_or(0),
        ),
    ]);

    let timestamp = station
        .timestamp
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Observation {
        id,
        label: station.name.clone(),
        gauges,
        timestamp,
        change: 0,
        location: Location {
            longitude: station.longitude,
            latitude: station.latitude,
        },
    }
}
