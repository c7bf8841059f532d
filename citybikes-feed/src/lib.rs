//! CityBikes feed adapter for the cadence engine.
//!
//! Polls one bike-share network from the CityBikes API
//! (<https://api.citybik.es>) and turns its station list into cadence
//! observations, so the engine can diff per-station bike availability
//! between polls.

pub mod api;
pub mod cities;
pub mod source;
pub mod transform;

pub use cities::{find_city, City, CITIES};
pub use source::CityBikesSource;
