use crate::metrics::PARSE_FALLBACKS_TOTAL;
use crate::model::{LocationPoint, RawEntry};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    static ref COORD_RE: Regex =
        Regex::new(r"Latitude: (-?[\d.]+), Longitude: (-?[\d.]+)").unwrap();
}

/// Device fields recovered from a raw capture log.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBeacon {
    pub latitude: f64,
    pub longitude: f64,
    pub rssi: i32,
    pub name: String,
}

impl Default for ParsedBeacon {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            rssi: 0,
            name: "Unknown".to_string(),
        }
    }
}

/// Extracts device fields from a raw capture log.
///
/// Entries are processed in input order and later entries overwrite
/// earlier ones of the same kind. Missing coordinates degrade to the
/// (0, 0) sentinel, which callers must treat as "no fix"; missing RSSI
/// degrades to 0 and a missing name to "Unknown".
pub fn parse_entries(entries: &[RawEntry]) -> ParsedBeacon {
    let mut parsed = ParsedBeacon::default();
    let mut have_fix = false;

    for entry in entries {
        let value = entry.value.trim();

        if value.starts_with("Latitude") {
            // A coordinate line that fails the pattern leaves any earlier
            // coordinates in place.
            if let Some(caps) = COORD_RE.captures(value) {
                if let (Ok(lat), Ok(lon)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
                    parsed.latitude = lat;
                    parsed.longitude = lon;
                    have_fix = true;
                }
            }
        } else if let Some(rest) = value.strip_prefix("Name") {
            // Canonical form is "Name: <text>"; the name is the text after
            // the first colon, trimmed.
            let name = match rest.split_once(':') {
                Some((_, after)) => after.trim(),
                None => rest.trim(),
            };
            if !name.is_empty() {
                parsed.name = name.to_string();
            }
        } else if let Ok(rssi) = value.parse::<i32>() {
            parsed.rssi = rssi;
        }
    }

    if !have_fix {
        warn!("No coordinate entry in capture log, using sentinel position");
        PARSE_FALLBACKS_TOTAL.inc();
    }

    parsed
}

/// Lifts the coordinate entries out of a raw capture log into structured
/// fixes, keeping each entry's capture timestamp. This is the migration
/// path for logs recorded before the structured track format existed.
pub fn fixes_from_log(entries: &[RawEntry]) -> Vec<LocationPoint> {
    entries
        .iter()
        .filter_map(|entry| {
            let caps = COORD_RE.captures(entry.value.trim())?;
            let latitude = caps[1].parse().ok()?;
            let longitude = caps[2].parse().ok()?;
            Some(LocationPoint {
                timestamp: entry.timestamp,
                latitude,
                longitude,
            })
        })
        .collect()
}
