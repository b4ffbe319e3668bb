use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::geo;
use crate::metrics::{ALERTS_TOTAL, FIXES_TOTAL, HISTORY_SIZE};
use crate::model::{DeviceState, HistoryEntry, LocationPoint};

/// Most recent derived updates kept for the dashboard log.
pub const HISTORY_LIMIT: usize = 10;

pub type SharedTracker = Arc<RwLock<Tracker>>;

/// In-memory view state for one device. Exactly one writer (the cycler
/// task); HTTP handlers read.
#[derive(Debug)]
pub struct Tracker {
    pub device: DeviceState,
    pub track: Vec<LocationPoint>,
    pub cursor: usize,
    pub history: VecDeque<HistoryEntry>,
    pub alert: bool,
    alert_seq: u64,
}

impl Tracker {
    pub fn new(device: DeviceState, track: Vec<LocationPoint>) -> Self {
        Self {
            device,
            track,
            cursor: 0,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            alert: false,
            alert_seq: 0,
        }
    }

    pub fn shared(device: DeviceState, track: Vec<LocationPoint>) -> SharedTracker {
        Arc::new(RwLock::new(Self::new(device, track)))
    }

    /// Advances the cursor circularly and returns the fix now under it.
    /// Returns None when no track is loaded, leaving all state untouched.
    pub fn advance(&mut self) -> Option<LocationPoint> {
        if self.track.is_empty() {
            return None;
        }

        self.cursor = (self.cursor + 1) % self.track.len();
        Some(self.track[self.cursor])
    }

    /// Applies a fix to the device and pushes the derived log entry.
    /// A real (non-sentinel) fix raises the alert flag; the returned token
    /// must be presented by the eventual clear so a newer alert is never
    /// clobbered by an older timer.
    pub fn apply_fix(&mut self, fix: LocationPoint, now: DateTime<Utc>) -> Option<u64> {
        let distance_km = geo::haversine_km(
            fix.latitude,
            fix.longitude,
            self.device.base_latitude,
            self.device.base_longitude,
        );

        self.device.latitude = fix.latitude;
        self.device.longitude = fix.longitude;
        self.device.distance_km = distance_km;
        self.device.last_fix_at = now;

        self.history.push_front(HistoryEntry {
            timestamp: now,
            latitude: fix.latitude,
            longitude: fix.longitude,
            distance_km,
        });
        self.history.truncate(HISTORY_LIMIT);
        HISTORY_SIZE.set(self.history.len() as f64);
        FIXES_TOTAL.inc();

        // (0, 0) is the parser's "no fix" sentinel and never alerts.
        if fix.latitude == 0.0 && fix.longitude == 0.0 {
            return None;
        }

        self.alert = true;
        self.alert_seq += 1;
        ALERTS_TOTAL.inc();
        Some(self.alert_seq)
    }

    /// Clears the alert unless a newer fix has re-raised it since the
    /// token was issued.
    pub fn clear_alert(&mut self, token: u64) {
        if self.alert_seq == token {
            self.alert = false;
        }
    }
}
