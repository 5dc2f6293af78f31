//! Area and perimeter of a polygon traced on a map.
//!
//! Area comes from the shoelace formula over spherical Web-Mercator
//! coordinates, rescaled by the Mercator scale factor at the polygon's mean
//! latitude. That is a flat-earth approximation: fine for a single property
//! (well under an acre to a few acres), increasingly wrong as the polygon grows
//! in north-south extent. Perimeter is the sum of great-circle legs.

use log::{debug, warn};
use pwpro_schemas::geo::{GeoCoordinate, MeasurementResult};
use std::f64::consts::FRAC_PI_4;

/// Mean Earth radius in metres (IUGG).
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;
pub const SQUARE_FEET_PER_SQUARE_METER: f64 = 10.76391041671;
pub const FEET_PER_METER: f64 = 3.280839895;

/// Latitude beyond which Web Mercator is undefined; inputs are clamped here.
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Measures the polygon implicitly closed by joining the last point to the first.
///
/// Fewer than three points yields a zero area and perimeter with the input
/// echoed back. Duplicate or collinear points simply contribute nothing.
pub fn measure_polygon(points: &[GeoCoordinate]) -> MeasurementResult {
    if points.len() < 3 {
        debug!("measure_polygon: {} point(s), nothing to measure", points.len());
        return MeasurementResult {
            area_square_feet: 0.0,
            perimeter_feet: 0.0,
            points: points.to_vec(),
        };
    }

    let area_m2 = planar_area_square_meters(points);
    let perimeter_m = perimeter_meters(points);

    let result = MeasurementResult {
        area_square_feet: finite_or_zero(area_m2 * SQUARE_FEET_PER_SQUARE_METER, "area"),
        perimeter_feet: finite_or_zero(perimeter_m * FEET_PER_METER, "perimeter"),
        points: points.to_vec(),
    };
    debug!(
        "measure_polygon: {} points -> {:.1} ft², {:.1} ft",
        points.len(),
        result.area_square_feet,
        result.perimeter_feet
    );
    result
}

/// Great-circle distance between two coordinates, in metres (haversine).
pub fn haversine_meters(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_MEAN_RADIUS_M * c
}

/// Equirectangular (east, north) offsets in feet from the first point.
///
/// For drawing and display only; measurements go through [`measure_polygon`].
pub fn local_offsets_feet(points: &[GeoCoordinate]) -> Vec<(f64, f64)> {
    let Some(origin) = points.first() else {
        return Vec::new();
    };
    let meters_per_degree = EARTH_MEAN_RADIUS_M.to_radians();
    let cos_lat = origin.lat.to_radians().cos();
    points
        .iter()
        .map(|p| {
            let east = longitude_delta(origin.lon, p.lon) * meters_per_degree * cos_lat * FEET_PER_METER;
            let north = (p.lat - origin.lat) * meters_per_degree * FEET_PER_METER;
            (east, north)
        })
        .collect()
}

fn perimeter_meters(points: &[GeoCoordinate]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| haversine_meters(&points[i], &points[(i + 1) % n]))
        .sum()
}

fn planar_area_square_meters(points: &[GeoCoordinate]) -> f64 {
    let lon0 = points[0].lon;
    let projected: Vec<(f64, f64)> = points
        .iter()
        .map(|p| project(p.lat, lon0 + longitude_delta(lon0, p.lon)))
        .collect();

    // Shift to the first vertex so the cross products stay small.
    let (ox, oy) = projected[0];
    let local: Vec<(f64, f64)> = projected.iter().map(|(x, y)| (x - ox, y - oy)).collect();

    let n = local.len();
    let twice_signed: f64 = (0..n)
        .map(|i| {
            let (xi, yi) = local[i];
            let (xj, yj) = local[(i + 1) % n];
            xi * yj - xj * yi
        })
        .sum();
    let projected_area = twice_signed.abs() / 2.0;

    let mean_lat = points.iter().map(|p| clamp_latitude(p.lat)).sum::<f64>() / n as f64;
    let scale = mean_lat.to_radians().cos();
    projected_area * scale * scale
}

/// Signed shortest longitude step from `from` to `to`, in `[-180, 180)`.
///
/// Keeps a lot that straddles the antimeridian contiguous.
fn longitude_delta(from: f64, to: f64) -> f64 {
    (to - from + 540.0).rem_euclid(360.0) - 180.0
}

/// Spherical Web-Mercator projection, in metres at the equator.
fn project(lat: f64, lon: f64) -> (f64, f64) {
    let lat = clamp_latitude(lat).to_radians();
    let x = EARTH_MEAN_RADIUS_M * lon.to_radians();
    let y = EARTH_MEAN_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln();
    (x, y)
}

fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
}

fn finite_or_zero(value: f64, what: &str) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!("measure_polygon: non-finite {} from input coordinates, reporting 0", what);
        0.0
    }
}
