use chrono::{DateTime, Utc};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two fixes in kilometres (haversine).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn format_distance(km: f64) -> String {
    format!("{:.2} km", km)
}

/// Human-readable age of a fix.
pub fn format_recency(timestamp: DateTime<Utc>) -> String {
    format_recency_at(timestamp, Utc::now())
}

fn format_recency_at(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(timestamp).num_minutes();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes == 1 {
        "1 min ago".to_string()
    } else {
        format!("{} mins ago", minutes)
    }
}
