use crate::models::BoundingBox;

/// Earth's radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate meters per degree of latitude
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Lower bound for cos(latitude) so longitude padding stays finite near the poles
const MIN_COS_LAT: f64 = 0.01;

/// Calculate the Haversine distance between two points in meters
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in meters
#[inline]
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Pad a bounding box by a radius in meters
///
/// Flat-earth approximation valid at city scale:
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(center latitude).
/// Proximity is re-checked with `haversine_m`, so this only has to avoid
/// dropping true candidates.
pub fn expand_bbox_by_radius(bbox: &BoundingBox, radius_m: f64) -> BoundingBox {
    let lat_delta = radius_m / METERS_PER_DEGREE;
    let cos_lat = bbox.center_lat().to_radians().cos().max(MIN_COS_LAT);
    let lon_delta = radius_m / (METERS_PER_DEGREE * cos_lat);

    BoundingBox {
        west: bbox.west - lon_delta,
        south: bbox.south - lat_delta,
        east: bbox.east + lon_delta,
        north: bbox.north + lat_delta,
    }
}

/// Check if a point is within a bounding box (edges inclusive)
#[inline]
pub fn is_within_bounding_box(lat: f64, lng: f64, bbox: &BoundingBox) -> bool {
    lng >= bbox.west && lng <= bbox.east && lat >= bbox.south && lat <= bbox.north
}
