mod asset;
mod cycler;
mod errors;
mod geo;
mod metrics;
mod model;
mod parse;
mod rest;
mod state;
mod validate;

use std::env;
use std::path::Path;

use axum::{routing::get, Router};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::model::{DeviceState, LocationPoint, UserInfo};
use crate::parse::ParsedBeacon;
use crate::state::Tracker;

// Fixed base station at the deployment site.
const BASE_LATITUDE: f64 = 28.749335;
const BASE_LONGITUDE: f64 = 77.117010;

const DEVICE_ID: &str = "aidlink-1";
const SAMPLE_BATTERY: u8 = 85;

#[tokio::main]
async fn main() {
    let http_addr = env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let track_file = env::var("TRACK_FILE").unwrap_or_else(|_| "data/track.json".to_string());
    let beacon_log_file =
        env::var("BEACON_LOG_FILE").unwrap_or_else(|_| "data/beacon_log.json".to_string());
    let cycle_interval_secs: u64 = env::var("CYCLE_INTERVAL_SECS")
        .unwrap_or_else(|_| "15".to_string())
        .parse()
        .unwrap_or(15);
    let alert_clear_secs: u64 = env::var("ALERT_CLEAR_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .unwrap_or(5);

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting AidLink Tracker");
    info!("HTTP server: {}", http_addr);
    info!("Track file: {}, beacon log: {}", track_file, beacon_log_file);
    info!(
        "Cycle interval: {}s, alert clear: {}s",
        cycle_interval_secs, alert_clear_secs
    );

    // Initialize metrics
    metrics::init_metrics();

    // The raw capture log supplies identity and signal fields for the
    // device card.
    let log_entries = match asset::load_beacon_log(Path::new(&beacon_log_file)) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("No usable beacon log ({}), using sample defaults", e);
            Vec::new()
        }
    };
    let beacon = parse::parse_entries(&log_entries);

    // Canonical structured track; an older raw log can stand in for a
    // missing track file.
    let track = match asset::load_track(Path::new(&track_file)) {
        Ok(track) => track,
        Err(e) => {
            warn!(
                "No usable track file ({}), deriving fixes from the beacon log",
                e
            );
            parse::fixes_from_log(&log_entries)
        }
    };
    if track.is_empty() {
        warn!("No recorded fixes available, live replay disabled");
    }

    let device = initial_device(&beacon, &track);
    info!(
        "Tracking device {} for {} ({} fixes loaded)",
        device.id,
        device.user.name,
        track.len()
    );

    let tracker = Tracker::shared(device, track);

    // Spawn the replay task
    let cycler_tracker = tracker.clone();
    let cycler_handle = tokio::spawn(async move {
        cycler::run_cycler(cycler_tracker, cycle_interval_secs, alert_clear_secs).await;
    });

    // Build HTTP app with REST API and metrics endpoint
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .merge(rest::create_router(tracker));

    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to bind to {}: {}", http_addr, e);
            std::process::exit(1);
        });

    info!("HTTP server listening on {}", http_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap_or_else(|e| {
            error!("HTTP server error: {}", e);
        });
    });

    tokio::select! {
        _ = cycler_handle => {
            error!("Cycler task terminated");
        }
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
}

/// Builds the startup device state: the first recorded fix wins, with the
/// parsed capture log as fallback.
fn initial_device(beacon: &ParsedBeacon, track: &[LocationPoint]) -> DeviceState {
    let (latitude, longitude) = match track.first() {
        Some(first) => (first.latitude, first.longitude),
        None => (beacon.latitude, beacon.longitude),
    };

    DeviceState {
        id: DEVICE_ID.to_string(),
        latitude,
        longitude,
        base_latitude: BASE_LATITUDE,
        base_longitude: BASE_LONGITUDE,
        battery: SAMPLE_BATTERY,
        rssi: beacon.rssi,
        distance_km: geo::haversine_km(latitude, longitude, BASE_LATITUDE, BASE_LONGITUDE),
        last_fix_at: Utc::now(),
        user: UserInfo {
            name: beacon.name.clone(),
            age: 21,
            team: "AidLink Response Team".to_string(),
            medical_notes: "No known allergies".to_string(),
        },
    }
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_device_prefers_first_recorded_fix() {
        let beacon = ParsedBeacon {
            latitude: 28.70,
            longitude: 77.10,
            rssi: -68,
            name: "Ishpreet Singh".to_string(),
        };
        let track = vec![LocationPoint {
            timestamp: Utc::now(),
            latitude: 28.750059,
            longitude: 77.1104783,
        }];

        let device = initial_device(&beacon, &track);

        assert_eq!(device.latitude, 28.750059);
        assert_eq!(device.rssi, -68);
        assert_eq!(device.user.name, "Ishpreet Singh");
        assert!(device.distance_km > 0.0);
    }

    #[test]
    fn test_initial_device_falls_back_to_parsed_log() {
        let beacon = ParsedBeacon::default();

        let device = initial_device(&beacon, &[]);

        // Sentinel position from an empty capture log.
        assert_eq!(device.latitude, 0.0);
        assert_eq!(device.longitude, 0.0);
        assert_eq!(device.user.name, "Unknown");
    }
}
