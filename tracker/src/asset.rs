use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::errors::Result;
use crate::model::{LocationPoint, RawEntry};
use crate::validate;

/// Loads the canonical recorded track, dropping out-of-range fixes.
pub fn load_track(path: &Path) -> Result<Vec<LocationPoint>> {
    let raw = fs::read_to_string(path)?;
    let points: Vec<LocationPoint> = serde_json::from_str(&raw)?;
    let total = points.len();

    let track: Vec<LocationPoint> = points
        .into_iter()
        .filter(|point| match validate::validate(point) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping recorded fix: {}", e);
                false
            }
        })
        .collect();

    info!(
        "Loaded {} of {} recorded fixes from {}",
        track.len(),
        total,
        path.display()
    );

    Ok(track)
}

/// Loads the raw capture log written by the recorder.
pub fn load_beacon_log(path: &Path) -> Result<Vec<RawEntry>> {
    let raw = fs::read_to_string(path)?;
    let entries: Vec<RawEntry> = serde_json::from_str(&raw)?;

    info!(
        "Loaded {} capture entries from {}",
        entries.len(),
        path.display()
    );

    Ok(entries)
}
