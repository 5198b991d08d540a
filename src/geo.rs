//! Great-circle distance and geofence admission

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Which transition a geofence check guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeofenceAction {
    CheckIn,
    CheckOut,
}

impl std::fmt::Display for GeofenceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeofenceAction::CheckIn => write!(f, "check in"),
            GeofenceAction::CheckOut => write!(f, "check out"),
        }
    }
}

/// Mean Earth radius used by the haversine formula, in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Distance to another point in meters
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance between two coordinates, in meters.
///
/// Inputs are expected to be valid latitudes/longitudes; range checks happen
/// at request validation.
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Persisted distances are whole meters
pub fn round_meters(distance: f64) -> i32 {
    distance.round() as i32
}

/// Geofence admission check shared by check-in and check-out.
///
/// A distance equal to the radius is admitted.
pub fn admit(distance: f64, radius_meters: i32, action: GeofenceAction) -> AppResult<()> {
    if distance > f64::from(radius_meters) {
        return Err(AppError::OutOfRange {
            distance,
            radius: radius_meters,
            action,
        });
    }
    Ok(())
}
