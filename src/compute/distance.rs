//! Great-circle distances on a spherical Earth.

use crate::error::{GeoError, Result};
use geobatch_types::point::GeoPoint;
use geobatch_types::result::DistanceResult;

/// Mean Earth radius used by the Haversine kernel, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two coordinates given in degrees.
///
/// The intermediate term `a` is clamped to `[0, 1]` so that rounding noise
/// near antipodal points cannot push `sqrt(1 - a)` out of its domain.
/// Identical coordinates return exactly `0.0`.
///
/// # Examples
///
/// ```
/// use geobatch::compute::distance::haversine;
///
/// let km = haversine(40.7128, -74.0060, 51.5074, -0.1278);
/// assert!((km - 5570.0).abs() < 5.0);
///
/// assert_eq!(haversine(10.0, 20.0, 10.0, 20.0), 0.0);
/// ```
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let half_lat = (d_lat / 2.0).sin();
    let half_lon = (d_lon / 2.0).sin();
    let a = half_lat * half_lat + lat1_rad.cos() * lat2_rad.cos() * half_lon * half_lon;
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Haversine distance in kilometres between two points.
#[inline]
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Pairwise distances between `from[i]` and `to[i]`.
///
/// Results follow input order. Each result carries a rounded display value
/// and the exact value for ranking.
///
/// # Errors
///
/// Returns [`GeoError::LengthMismatch`] if the slices differ in length. No
/// partial results are produced in that case.
///
/// # Examples
///
/// ```
/// use geobatch::compute::distance::batch_distance;
/// use geobatch::GeoPoint;
///
/// let from = vec![GeoPoint::new(40.7128, -74.0060), GeoPoint::new(0.0, 0.0)];
/// let to = vec![GeoPoint::new(51.5074, -0.1278), GeoPoint::new(0.0, 1.0)];
///
/// let results = batch_distance(&from, &to)?;
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[1].distance_km, 111.195);
///
/// assert!(batch_distance(&from, &to[..1]).is_err());
/// # Ok::<(), geobatch::GeoError>(())
/// ```
pub fn batch_distance<'a>(
    from: &'a [GeoPoint],
    to: &'a [GeoPoint],
) -> Result<Vec<DistanceResult<'a>>> {
    if from.len() != to.len() {
        return Err(GeoError::LengthMismatch {
            from: from.len(),
            to: to.len(),
        });
    }

    Ok(from
        .iter()
        .zip(to)
        .enumerate()
        .map(|(index, (a, b))| DistanceResult::new(a, b, index, distance_km(a, b)))
        .collect())
}
