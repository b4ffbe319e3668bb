use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded beacon fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

/// One raw receiver line, as the recorder captures it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    pub timestamp: DateTime<Utc>,
    pub value: String,
}

/// Static wearer record attached to a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub age: u8,
    pub team: String,
    pub medical_notes: String,
}

/// The currently displayed device. Written only by the cycler task.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceState {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub base_latitude: f64,
    pub base_longitude: f64,
    pub battery: u8,
    pub rssi: i32,
    pub distance_km: f64,
    pub last_fix_at: DateTime<Utc>,
    pub user: UserInfo,
}

/// Derived update pushed on every replay tick, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// Device card payload with display-formatted fields.
#[derive(Debug, Serialize)]
pub struct DeviceSnapshot {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery: u8,
    pub rssi: i32,
    pub distance: String,
    pub last_update: String,
    pub alert: bool,
    pub user: UserInfo,
}

/// Device list payload.
#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub id: String,
    pub status: String,
    pub battery: u8,
    pub last_signal: String,
}

/// REST API response wrapper for the history log.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<HistoryEntry>,
    pub total: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct MapMarker {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// What a map collaborator needs: center, markers and the base-to-device
/// path.
#[derive(Debug, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub markers: Vec<MapMarker>,
    pub path: Vec<[f64; 2]>,
}

/// Contact card payload.
#[derive(Debug, Serialize)]
pub struct ContactProfile {
    pub user: UserInfo,
    pub email: String,
    pub team_members: Vec<String>,
}
