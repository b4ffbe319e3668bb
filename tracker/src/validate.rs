use crate::errors::{Error, Result};
use crate::model::LocationPoint;

const LAT_MIN: f64 = -90.0;
const LAT_MAX: f64 = 90.0;
const LON_MIN: f64 = -180.0;
const LON_MAX: f64 = 180.0;

/// Validates a recorded fix before it enters the replay track.
pub fn validate(point: &LocationPoint) -> Result<()> {
    if !point.latitude.is_finite() || point.latitude < LAT_MIN || point.latitude > LAT_MAX {
        return Err(Error::Validation(format!(
            "Latitude {} out of range [{}, {}]",
            point.latitude, LAT_MIN, LAT_MAX
        )));
    }

    if !point.longitude.is_finite() || point.longitude < LON_MIN || point.longitude > LON_MAX {
        return Err(Error::Validation(format!(
            "Longitude {} out of range [{}, {}]",
            point.longitude, LON_MIN, LON_MAX
        )));
    }

    Ok(())
}
