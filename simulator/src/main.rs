mod telemetry;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Simulated fleet of ESP8266 temperature/humidity sensors
#[derive(Debug, Parser)]
#[command(name = "sensor-simulator", version)]
struct Args {
    /// Base URL of the sensor hub
    #[arg(long, env = "HUB_URL", default_value = "http://localhost:3000")]
    hub_url: String,

    /// Number of simulated devices
    #[arg(long, env = "DEVICES", default_value_t = 3)]
    devices: usize,

    /// Delay between reporting rounds
    #[arg(long, env = "INTERVAL_MS", default_value_t = 5000)]
    interval_ms: u64,

    /// Post a generic sensor reading every N rounds (0 disables)
    #[arg(long, env = "GENERIC_EVERY", default_value_t = 3)]
    generic_every: u64,

    /// Report device status each round and mark devices offline on exit
    #[arg(long, env = "REPORT_STATUS", default_value_t = false)]
    report_status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting sensor simulator");
    info!(
        "Hub: {}, Devices: {}, Interval: {}ms",
        args.hub_url, args.devices, args.interval_ms
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")?;
    let base = args.hub_url.trim_end_matches('/').to_string();

    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut round = 0u64;
    let mut accepted = 0u64;
    let mut rejected = 0u64;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
        }
        round += 1;

        for index in 0..args.devices {
            let reading = telemetry::temperature_reading(&mut rng, index);
            let url = format!("{}/api/sensors/temperature", base);
            match send(client.post(&url), &reading).await {
                Some(status) if status.is_success() => accepted += 1,
                Some(status) if status.is_client_error() => {
                    rejected += 1;
                    debug!(
                        "Hub rejected {} reading {}°C",
                        reading.device_id, reading.temperature
                    );
                }
                _ => {}
            }

            if args.generic_every > 0 && round % args.generic_every == 0 {
                let reading = telemetry::generic_reading(&mut rng, index);
                let url = format!("{}/api/sensors", base);
                send(client.post(&url), &reading).await;
            }

            if args.report_status {
                let url = format!("{}/api/devices/status", base);
                send(client.put(&url), &telemetry::status(index, true)).await;
            }
        }

        if round % 10 == 0 {
            info!(
                "Round {}: {} readings accepted, {} rejected",
                round, accepted, rejected
            );
        }
    }

    if args.report_status {
        let url = format!("{}/api/devices/status", base);
        for index in 0..args.devices {
            send(client.put(&url), &telemetry::status(index, false)).await;
        }
        info!("Marked {} devices offline", args.devices);
    }

    info!(
        "Simulator stopped after {} rounds ({} accepted, {} rejected)",
        round, accepted, rejected
    );
    Ok(())
}

/// Sends one JSON request; returns the response status, or `None` if the hub was unreachable.
async fn send<T: Serialize>(request: RequestBuilder, body: &T) -> Option<StatusCode> {
    match request.json(body).send().await {
        Ok(resp) => {
            let status = resp.status();
            if status.is_server_error() {
                warn!("Hub returned {}", status);
            }
            Some(status)
        }
        Err(e) => {
            error!("Failed to reach hub: {}", e);
            None
        }
    }
}
