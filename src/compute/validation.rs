//! Validation for geographic coordinates.

use crate::error::{GeoError, Result};
use geobatch_types::point::{GeoPoint, in_range};

pub use geobatch_types::point::{LATITUDE_RANGE, LONGITUDE_RANGE};

/// Checks that latitude is in [-90, 90] and longitude is in [-180, 180].
///
/// Bounds are inclusive. `NaN` fails both range checks, so any `NaN`
/// component makes the coordinate invalid.
///
/// # Examples
///
/// ```
/// use geobatch::compute::validation::is_valid;
///
/// assert!(is_valid(40.7128, -74.0060));
/// assert!(is_valid(90.0, -180.0));
/// assert!(!is_valid(90.0001, 0.0));
/// assert!(!is_valid(f64::NAN, 0.0));
/// ```
#[inline]
pub fn is_valid(latitude: f64, longitude: f64) -> bool {
    in_range(latitude, longitude)
}

/// Like [`is_valid`], but reports the offending coordinate as an error.
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    if is_valid(latitude, longitude) {
        Ok(())
    } else {
        Err(GeoError::InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

/// Validates a point's coordinates. The `valid` flag on the point is not consulted.
pub fn validate_point(point: &GeoPoint) -> Result<()> {
    validate_coordinate(point.latitude, point.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        assert!(is_valid(40.7128, -74.0060)); // NYC
        assert!(is_valid(51.5074, -0.1278)); // London
        assert!(is_valid(35.6895, 139.6917)); // Tokyo

        // Edge cases
        assert!(is_valid(90.0, 0.0));
        assert!(is_valid(-90.0, 0.0));
        assert!(is_valid(0.0, 180.0));
        assert!(is_valid(0.0, -180.0));
        assert!(is_valid(-0.0, -0.0));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(!is_valid(90.000_001, 0.0));
        assert!(!is_valid(-91.0, 0.0));
        assert!(!is_valid(0.0, 180.5));
        assert!(!is_valid(0.0, -200.0));
        assert!(!is_valid(95.0, 200.0));
    }

    #[test]
    fn test_non_finite_coordinates() {
        assert!(!is_valid(f64::NAN, 0.0));
        assert!(!is_valid(0.0, f64::NAN));
        assert!(!is_valid(f64::INFINITY, 0.0));
        assert!(!is_valid(0.0, f64::NEG_INFINITY));
    }

    #[test]
    fn test_validate_coordinate_error() {
        let err = validate_coordinate(100.0, 10.0).unwrap_err();
        assert!(matches!(
            err,
            GeoError::InvalidCoordinate {
                latitude,
                longitude
            } if latitude == 100.0 && longitude == 10.0
        ));
    }
}
