use anyhow::{Context, Result};
use cadence::{Feed, FeedConfig};
use citybikes_feed::cities::find_city;
use citybikes_feed::source::CityBikesSource;
use citybikes_feed::transform::{GAUGE_AVAILABLE, GAUGE_EBIKES, GAUGE_EMPTY_SLOTS};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citybikes_feed=info,cadence=info".into()),
        )
        .init();

    info!("CityBikes feed starting...");

    // Read configuration from environment
    let city_name =
        std::env::var("CITYBIKES_CITY").unwrap_or_else(|_| "New York".to_string());

    let poll_interval_secs: u64 = std::env::var("CITYBIKES_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "240".to_string())
        .parse()
        .context("CITYBIKES_POLL_INTERVAL_SECS must be a number of seconds")?;

    let paced_delivery = std::env::var("CITYBIKES_PACED")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(true);

    let city = find_city(&city_name)
        .with_context(|| format!("Unknown city: {}", city_name))?;

    info!(
        city = city.name,
        network = city.network_id,
        poll_interval_secs,
        paced = paced_delivery,
        "Configuration loaded"
    );

    let config = FeedConfig {
        poll_interval_secs,
        paced_delivery,
        primary_gauges: vec![GAUGE_AVAILABLE.to_string(), GAUGE_EBIKES.to_string()],
        capacity_gauges: vec![GAUGE_EMPTY_SLOTS.to_string()],
    };

    let source = Arc::new(CityBikesSource::new(city.network_id));
    let feed = Arc::new(Feed::new(source, config)?);

    let mut new_entities = feed.subscribe_new_entities();
    let mut changes = feed.subscribe_changes();

    let feed_info = feed.connect().await.context("Failed to connect feed")?;
    info!(feed = %feed_info.title, "Feed connected, watching for changes");

    // Log deliveries until a shutdown signal arrives
    loop {
        tokio::select! {
            record = new_entities.recv() => match record {
                Ok(record) => info!(
                    station = record.label.as_deref().unwrap_or(&record.id),
                    available = record.gauge(GAUGE_AVAILABLE),
                    ebikes = record.gauge(GAUGE_EBIKES),
                    "New station"
                ),
                Err(e) => warn!(error = %e, "New-station channel closed or lagged"),
            },
            record = changes.recv() => match record {
                Ok(record) => info!(
                    station = record.label.as_deref().unwrap_or(&record.id),
                    change = record.change,
                    available = record.gauge(GAUGE_AVAILABLE),
                    "Inventory change"
                ),
                Err(e) => warn!(error = %e, "Change channel closed or lagged"),
            },
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for ctrl_c signal")?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Graceful shutdown
    let inventory = feed.inventory();
    info!(
        stations = inventory.entities,
        available = inventory.available,
        net_change = inventory.net_change,
        "Final inventory"
    );
    feed.disconnect().await;
    info!("CityBikes feed stopped");

    Ok(())
}
