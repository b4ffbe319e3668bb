use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::metrics::TICKS_TOTAL;
use crate::state::SharedTracker;

/// Replays the recorded track on a fixed interval, simulating live
/// movement of the beacon. Runs until the task is aborted at shutdown.
pub async fn run_cycler(tracker: SharedTracker, interval_secs: u64, alert_clear_secs: u64) {
    info!(
        "Starting cycler with interval={}s, alert_clear={}s",
        interval_secs, alert_clear_secs
    );

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // An interval's first tick completes immediately; consume it so the
    // initial fix stays on screen for one full period.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        TICKS_TOTAL.inc();

        let mut t = tracker.write().await;
        let Some(fix) = t.advance() else {
            debug!("No recorded track loaded, skipping tick");
            continue;
        };

        let token = t.apply_fix(fix, Utc::now());
        debug!(
            "Applied fix {}/{}: ({}, {}), {:.2} km from base",
            t.cursor + 1,
            t.track.len(),
            fix.latitude,
            fix.longitude,
            t.device.distance_km
        );
        drop(t);

        // Real fixes raise a transient alert; clear it once the delay
        // passes unless a newer fix has re-raised it.
        if let Some(token) = token {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(alert_clear_secs)).await;
                tracker.write().await.clear_alert(token);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceState, LocationPoint, UserInfo};
    use crate::state::Tracker;
    use chrono::TimeZone;

    fn sample_tracker(track_len: usize) -> SharedTracker {
        let track: Vec<LocationPoint> = (0..track_len)
            .map(|i| LocationPoint {
                timestamp: Utc.with_ymd_and_hms(2025, 3, 18, 9, 14, i as u32).unwrap(),
                latitude: 28.75 + i as f64 * 0.001,
                longitude: 77.11 + i as f64 * 0.001,
            })
            .collect();

        let device = DeviceState {
            id: "aidlink-1".to_string(),
            latitude: 28.75,
            longitude: 77.11,
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

        Tracker::shared(device, track)
    }

    #[test]
    fn test_cycler_applies_fixes_on_ticks() {
        tokio_test::block_on(async {
            let tracker = sample_tracker(3);
            let handle = tokio::spawn(run_cycler(tracker.clone(), 1, 1));

            // Two 1s ticks fit comfortably in this window.
            tokio::time::sleep(Duration::from_millis(2400)).await;
            handle.abort();

            let t = tracker.read().await;
            assert!(!t.history.is_empty());
            assert!(t.cursor < t.track.len());
            assert_eq!(t.device.latitude, t.track[t.cursor].latitude);
        });
    }

    #[test]
    fn test_cycler_is_noop_without_track() {
        tokio_test::block_on(async {
            let tracker = sample_tracker(0);
            let before_lat = tracker.read().await.device.latitude;
            let handle = tokio::spawn(run_cycler(tracker.clone(), 1, 1));

            tokio::time::sleep(Duration::from_millis(1400)).await;
            handle.abort();

            let t = tracker.read().await;
            assert_eq!(t.cursor, 0);
            assert_eq!(t.device.latitude, before_lat);
            assert!(t.history.is_empty());
            assert!(!t.alert);
        });
    }
}
