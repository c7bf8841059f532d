use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const BASE_URL: &str = "https://api.citybik.es";

/// Top-level CityBikes network response.
#[derive(Debug, Deserialize)]
pub struct NetworkResponse {
    pub network: Network,
}

/// One bike-share network and its stations.
#[derive(Debug, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub location: Option<NetworkLocation>,
    #[serde(default)]
    pub stations: Vec<Station>,
}

/// Coverage area reported for a network.
#[derive(Debug, Deserialize)]
pub struct NetworkLocation {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One bike station as reported by the CityBikes API.
#[derive(Debug, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: Option<String>,
    pub timestamp: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub free_bikes: Option<i64>,
    pub empty_slots: Option<i64>,
    #[serde(default)]
    pub extra: StationExtra,
}

/// The "extra" block of a station. Fields vary per network; everything
/// here is optional.
#[derive(Debug, Default, Deserialize)]
pub struct StationExtra {
    pub uid: Option<String>,
    pub address: Option<String>,
    pub ebikes: Option<i64>,
}

/// HTTP client for the CityBikes REST API.
///
/// No authentication; the API is public and read-only.
pub struct CityBikesClient {
    http_client: Client,
    base_url: String,
}

impl CityBikesClient {
    /// Create a client using the real CityBikes base URL.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(base_url: String) -> Self {
        let http_client = Client::builder()
            .user_agent("cadence-citybikes/1.0")
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http_client,
            base_url,
        }
    }

    /// Fetch one network with its full current station list.
    pub async fn fetch_network(&self, network_id: &str) -> Result<Network> {
        let url = format!("{}/v2/networks/{}", self.base_url, network_id);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to send fetch_network request")?;

        check_response_status(&response, network_id)?;
        let body = response
            .json::<NetworkResponse>()
            .await
            .context("Failed to parse network response")?;
        Ok(body.network)
    }
}

impl Default for CityBikesClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the response status and map known error codes to descriptive errors.
///
/// - 404 → unknown network id
/// - 429 → rate limited
/// - Other non-2xx → generic API error
fn check_response_status(response: &reqwest::Response, network_id: &str) -> Result<()> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(anyhow!("CityBikes network not found: {}", network_id)),
        StatusCode::TOO_MANY_REQUESTS => Err(anyhow!("CityBikes rate limit exceeded")),
        s if !s.is_success() => Err(anyhow!("CityBikes API error: {}", s)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_network() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/networks/citi-bike-nyc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "network": {
                        "id": "citi-bike-nyc",
                        "name": "Citi Bike",
                        "location": {
                            "city": "New York, NY",
                            "country": "US",
                            "latitude": 40.7128,
                            "longitude": -74.0060
                        },
                        "stations": [
                            {
                                "id": "obs-1",
                                "name": "W 52 St & 11 Ave",
                                "timestamp": "2026-08-29T12:00:00.000000Z",
                                "longitude": -73.9939,
                                "latitude": 40.7677,
                                "free_bikes": 12,
                                "empty_slots": 27,
                                "extra": {
                                    "uid": "66db237e",
                                    "address": "W 52 St & 11 Ave",
                                    "ebikes": 3
                                }
                            }
                        ]
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = CityBikesClient::with_base_url(server.url());
        let network = client.fetch_network("citi-bike-nyc").await.unwrap();

        assert_eq!(network.id, "citi-bike-nyc");
        assert_eq!(network.name, "Citi Bike");
        assert_eq!(network.location.unwrap().city, "New York, NY");
        assert_eq!(network.stations.len(), 1);

        let station = &network.stations[0];
        assert_eq!(station.id, "obs-1");
        assert_eq!(station.free_bikes, Some(12));
        assert_eq!(station.empty_slots, Some(27));
        assert_eq!(station.extra.uid.as_deref(), Some("66db237e"));
        assert_eq!(station.extra.ebikes, Some(3));
    }

    #[tokio::test]
    async fn test_fetch_network_tolerates_sparse_stations() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/networks/velib")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "network": {
                        "id": "velib",
                        "name": "Velib",
                        "stations": [
                            {
                                "id": "obs-2",
                                "longitude": 2.3522,
                                "latitude": 48.8566
                            }
                        ]
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = CityBikesClient::with_base_url(server.url());
        let network = client.fetch_network("velib").await.unwrap();

        let station = &network.stations[0];
        assert_eq!(station.name, None);
        assert_eq!(station.free_bikes, None);
        assert_eq!(station.extra.uid, None);
    }

    #[tokio::test]
    async fn test_fetch_network_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/networks/no-such-network")
            .with_status(404)
            .create_async()
            .await;

        let client = CityBikesClient::with_base_url(server.url());
        let result = client.fetch_network("no-such-network").await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("network not found"));
    }

    #[tokio::test]
    async fn test_fetch_network_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/networks/bikemi")
            .with_status(500)
            .create_async()
            .await;

        let client = CityBikesClient::with_base_url(server.url());
        let result = client.fetch_network("bikemi").await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API error"));
    }
}
