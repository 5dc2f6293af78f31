use crate::geo::GeoCoordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A booked job on the calendar, as stored in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub owner_name: String,
    pub address: String,
    pub scope: String,
    pub date: DateTime<Utc>,
    pub estimate_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ScheduleItem {
    pub fn new(
        owner_name: impl Into<String>,
        address: impl Into<String>,
        scope: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_name: owner_name.into(),
            address: address.into(),
            scope: scope.into(),
            date,
            estimate_id: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoCoordinate::new(lat, lon)),
            _ => None,
        }
    }

    pub fn set_coordinate(&mut self, coordinate: GeoCoordinate) {
        self.latitude = Some(coordinate.lat);
        self.longitude = Some(coordinate.lon);
    }

    pub fn needs_geocoding(&self) -> bool {
        self.coordinate().is_none()
    }
}
