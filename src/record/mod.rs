// Observation records (the unit of everything the engine moves around)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geographic position of an entity (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

/// One entity's polled attributes at a point in time
///
/// Sources produce observations with `change = 0`; the delta engine sets
/// `change` on the records it emits. The snapshot store only ever holds
/// raw observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Stable unique identifier for the entity
    pub id: String,

    /// Human-readable name, carried for logging and display
    pub label: Option<String>,

    /// Numeric gauges by name
    pub gauges: HashMap<String, i64>,

    /// Observation time reported by the source
    pub timestamp: DateTime<Utc>,

    /// Signed change magnitude; 0 unless produced by a diff
    pub change: i64,

    /// Geographic position
    pub location: Location,
}

impl Observation {
    /// Read a gauge value, treating a missing gauge as 0
    pub fn gauge(&self, name: &str) -> i64 {
        self.gauges.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_observation(gauges: &[(&str, i64)]) -> Observation {
        Observation {
            id: "st-1".to_string(),
            label: Some("Station 1".to_string()),
            gauges: gauges
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
            timestamp: Utc::now(),
            change: 0,
            location: Location {
                longitude: -74.0060,
                latitude: 40.7128,
            },
        }
    }

    #[test]
    fn gauge_returns_value_when_present() {
        let record = make_observation(&[("available", 7), ("empty_slots", 3)]);
        assert_eq!(record.gauge("available"), 7);
        assert_eq!(record.gauge("empty_slots"), 3);
    }

    #[test]
    fn missing_gauge_reads_as_zero() {
        let record = make_observation(&[("available", 7)]);
        assert_eq!(record.gauge("ebikes"), 0);
    }

    #[test]
    fn negative_gauge_values_are_carried_through() {
        let record = make_observation(&[("available", -2)]);
        assert_eq!(record.gauge("available"), -2);
    }
}
