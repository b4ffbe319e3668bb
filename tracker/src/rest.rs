use crate::geo;
use crate::model::{
    ContactProfile, DeviceSnapshot, DeviceSummary, HistoryEntry, HistoryResponse, MapMarker,
    MapView,
};
use crate::state::{SharedTracker, Tracker, HISTORY_LIMIT};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::error;

const CONTACT_EMAIL: &str = "ishpreet@outlook.in";
const TEAM_MEMBERS: [&str; 4] = [
    "Ishpreet Singh",
    "Inder Sharma",
    "Avirath Magoo",
    "Keshav Garg",
];

#[derive(Debug, Clone)]
struct AppState {
    tracker: SharedTracker,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<usize>,
}

pub fn create_router(tracker: SharedTracker) -> Router {
    let state = AppState { tracker };

    Router::new()
        .route("/api/v1/device", get(get_device))
        .route("/api/v1/history", get(get_history))
        .route("/api/v1/devices", get(get_devices))
        .route("/api/v1/profile", get(get_profile))
        .route("/api/v1/map", get(get_map))
        .with_state(state)
}

fn snapshot(t: &Tracker) -> DeviceSnapshot {
    let d = &t.device;

    DeviceSnapshot {
        id: d.id.clone(),
        latitude: d.latitude,
        longitude: d.longitude,
        battery: d.battery,
        rssi: d.rssi,
        distance: geo::format_distance(d.distance_km),
        last_update: geo::format_recency(d.last_fix_at),
        alert: t.alert,
        user: d.user.clone(),
    }
}

async fn get_device(State(state): State<AppState>) -> Json<DeviceSnapshot> {
    let t = state.tracker.read().await;
    Json(snapshot(&t))
}

async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = params.limit.unwrap_or(HISTORY_LIMIT).min(HISTORY_LIMIT);

    if let (Some(start), Some(end)) = (params.start, params.end) {
        if start > end {
            return Err(AppError(anyhow::anyhow!(
                "Invalid range: start {} is after end {}",
                start,
                end
            )));
        }
    }

    let t = state.tracker.read().await;
    let data: Vec<HistoryEntry> = t
        .history
        .iter()
        .filter(|e| params.start.map_or(true, |start| e.timestamp >= start))
        .filter(|e| params.end.map_or(true, |end| e.timestamp <= end))
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(HistoryResponse {
        total: data.len(),
        data,
        limit,
    }))
}

async fn get_devices(State(state): State<AppState>) -> Json<Vec<DeviceSummary>> {
    let t = state.tracker.read().await;
    let status = if t.alert { "SOS" } else { "Active" };

    Json(vec![DeviceSummary {
        id: t.device.id.clone(),
        status: status.to_string(),
        battery: t.device.battery,
        last_signal: geo::format_recency(t.device.last_fix_at),
    }])
}

async fn get_profile(State(state): State<AppState>) -> Json<ContactProfile> {
    let t = state.tracker.read().await;

    Json(ContactProfile {
        user: t.device.user.clone(),
        email: CONTACT_EMAIL.to_string(),
        team_members: TEAM_MEMBERS.iter().map(|m| m.to_string()).collect(),
    })
}

async fn get_map(State(state): State<AppState>) -> Json<MapView> {
    let t = state.tracker.read().await;
    let d = &t.device;

    Json(MapView {
        center: [d.latitude, d.longitude],
        markers: vec![
            MapMarker {
                label: "device".to_string(),
                latitude: d.latitude,
                longitude: d.longitude,
            },
            MapMarker {
                label: "base".to_string(),
                latitude: d.base_latitude,
                longitude: d.base_longitude,
            },
        ],
        path: vec![
            [d.base_latitude, d.base_longitude],
            [d.latitude, d.longitude],
        ],
    })
}

#[derive(Debug)]
struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("API error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceState, LocationPoint, UserInfo};
    use chrono::Duration;

    fn sample_state(track: Vec<LocationPoint>) -> AppState {
        let device = DeviceState {
            id: "aidlink-1".to_string(),
            latitude: 28.749335,
            longitude: 77.117010,
            base_latitude: 28.749335,
            base_longitude: 77.117010,
            battery: 85,
            rssi: -70,
            distance_km: 0.0,
            last_fix_at: Utc::now(),
            user: UserInfo {
                name: "Ishpreet Singh".to_string(),
                age: 21,
                team: "AidLink Response Team".to_string(),
                medical_notes: "No known allergies".to_string(),
            },
        };

        AppState {
            tracker: Tracker::shared(device, track),
        }
    }

    #[test]
    fn test_device_snapshot_formats_fields() {
        tokio_test::block_on(async {
            let state = sample_state(Vec::new());

            let Json(snap) = get_device(State(state)).await;

            // Device parked on the base station.
            assert_eq!(snap.distance, "0.00 km");
            assert_eq!(snap.last_update, "Just now");
            assert_eq!(snap.id, "aidlink-1");
            assert_eq!(snap.rssi, -70);
            assert!(!snap.alert);
        });
    }

    #[test]
    fn test_history_respects_limit_and_order() {
        tokio_test::block_on(async {
            let state = sample_state(Vec::new());
            {
                let mut t = state.tracker.write().await;
                for i in 0..6 {
                    let fix = LocationPoint {
                        timestamp: Utc::now(),
                        latitude: 28.75 + i as f64 * 0.001,
                        longitude: 77.11,
                    };
                    t.apply_fix(fix, Utc::now() + Duration::seconds(i as i64));
                }
            }

            let params = HistoryQuery {
                start: None,
                end: None,
                limit: Some(3),
            };
            let Json(resp) = get_history(State(state), Query(params)).await.unwrap();

            assert_eq!(resp.total, 3);
            assert_eq!(resp.data.len(), 3);
            // Newest first.
            assert!(resp.data[0].timestamp > resp.data[1].timestamp);
        });
    }

    #[test]
    fn test_history_rejects_inverted_range() {
        tokio_test::block_on(async {
            let state = sample_state(Vec::new());
            let params = HistoryQuery {
                start: Some(Utc::now()),
                end: Some(Utc::now() - Duration::hours(1)),
                limit: None,
            };

            let result = get_history(State(state), Query(params)).await;

            assert!(result.is_err());
        });
    }

    #[test]
    fn test_devices_status_follows_alert_flag() {
        tokio_test::block_on(async {
            let state = sample_state(Vec::new());

            let Json(devices) = get_devices(State(state.clone())).await;
            assert_eq!(devices.len(), 1);
            assert_eq!(devices[0].status, "Active");

            {
                let mut t = state.tracker.write().await;
                let fix = LocationPoint {
                    timestamp: Utc::now(),
                    latitude: 28.7515,
                    longitude: 77.113,
                };
                t.apply_fix(fix, Utc::now());
            }

            let Json(devices) = get_devices(State(state)).await;
            assert_eq!(devices[0].status, "SOS");
        });
    }

    #[test]
    fn test_map_view_links_base_to_device() {
        tokio_test::block_on(async {
            let state = sample_state(Vec::new());

            let Json(map) = get_map(State(state)).await;

            assert_eq!(map.markers.len(), 2);
            assert_eq!(map.path.len(), 2);
            assert_eq!(map.center, [28.749335, 77.117010]);
            assert_eq!(map.path[1], map.center);
        });
    }

    #[test]
    fn test_profile_carries_team_contacts() {
        tokio_test::block_on(async {
            let state = sample_state(Vec::new());

            let Json(profile) = get_profile(State(state)).await;

            assert_eq!(profile.user.name, "Ishpreet Singh");
            assert_eq!(profile.email, CONTACT_EMAIL);
            assert_eq!(profile.team_members.len(), 4);
        });
    }
}
