use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS-84 latitude/longitude pair in degrees.
///
/// No range validation happens here; values outside `[-90, 90]` / `[-180, 180]`
/// are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Area and perimeter of a polygon traced on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub area_square_feet: f64,
    pub perimeter_feet: f64,
    /// The input points, echoed back in their original order.
    pub points: Vec<GeoCoordinate>,
}

impl MeasurementResult {
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// True when fewer than three points were supplied and nothing was measured.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }
}

/// A list of points as stored in a measurement file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFile {
    pub schema_version: String,
    pub label: Option<String>,
    pub points: Vec<GeoCoordinate>,
}
