use anyhow::Result;
use async_trait::async_trait;
use cadence::{FeedInfo, FeedSource, Location, Observation};
use tracing::debug;

use crate::api::{CityBikesClient, BASE_URL};
use crate::transform::station_to_observation;

/// CityBikes feed source — polls one bike-share network and reports
/// every station as an entity with availability gauges.
pub struct CityBikesSource {
    network_id: String,
    client: CityBikesClient,
}

impl CityBikesSource {
    /// Create a source for one network using the real CityBikes API.
    pub fn new(network_id: impl Into<String>) -> Self {
        Self::with_base_url(network_id, BASE_URL.to_string())
    }

    /// Create a source with a custom API base URL (for testing).
    pub fn with_base_url(network_id: impl Into<String>, base_url: String) -> Self {
        Self {
            network_id: network_id.into(),
            client: CityBikesClient::with_base_url(base_url),
        }
    }
}

#[async_trait]
impl FeedSource for CityBikesSource {
    fn name(&self) -> &str {
        "citybikes"
    }

    async fn open(&self) -> Result<FeedInfo> {
        // The handshake fetches the network once; an unknown network id
        // fails the connect before any polling starts.
        let network = self.client.fetch_network(&self.network_id).await?;

        let title = match &network.location {
            Some(location) => format!("{} ({})", network.name, location.city),
            None => network.name.clone(),
        };
        let location = network.location.map(|loc| Location {
            longitude: loc.longitude,
            latitude: loc.latitude,
        });

        Ok(FeedInfo { title, location })
    }

    async fn fetch_snapshot(&self) -> Result<Vec<Observation>> {
        let network = self.client.fetch_network(&self.network_id).await?;
        debug!(
            network = %self.network_id,
            stations = network.stations.len(),
            "Fetched station snapshot"
        );

        Ok(network
            .stations
            .iter()
            .map(station_to_observation)
            .collect())
    }
}
