//! Office model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::geo::Coordinates;

/// Registered office with its geofence
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Office {
    pub id: i64,
    pub name: String,
    /// Display only
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Admission threshold in meters
    pub radius_meters: i32,
    /// Inactive offices are not offered as check-in targets
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Office {
    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Distance in meters between `point` and the office center
    pub fn distance_from(&self, point: &Coordinates) -> f64 {
        point.distance_to(&self.center())
    }
}

/// Short office representation for lists and session views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfficeShort {
    pub id: i64,
    pub name: String,
    pub address: String,
}

impl From<&Office> for OfficeShort {
    fn from(office: &Office) -> Self {
        Self {
            id: office.id,
            name: office.name.clone(),
            address: office.address.clone(),
        }
    }
}
