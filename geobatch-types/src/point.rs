use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;
use std::time::SystemTime;

/// Passthrough fields carried alongside a point's coordinates.
///
/// Keys keep the order in which they were supplied.
pub type Attributes = Map<String, Value>;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Whether both components lie in their inclusive ranges. `NaN` is never in range.
#[inline]
pub fn in_range(latitude: f64, longitude: f64) -> bool {
    LATITUDE_RANGE.contains(&latitude) && LONGITUDE_RANGE.contains(&longitude)
}

/// A geographic point record.
///
/// Coordinates are in decimal degrees. `valid` and `processed_at` are set
/// once the point has gone through batch processing; until then the point
/// is unverified and `valid` is `false`. A deserialized point only keeps
/// `valid = true` if its coordinates are in range.
///
/// # Examples
///
/// ```
/// use geobatch_types::point::GeoPoint;
///
/// let london = GeoPoint::new(51.5074, -0.1278)
///     .with_attribute("id", 7)
///     .with_attribute("name", "London");
///
/// assert!(!london.valid);
/// assert_eq!(london.attributes.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredGeoPoint")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<SystemTime>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Attributes,
}

/// Wire form of [`GeoPoint`], re-checked on the way in.
#[derive(Deserialize)]
struct StoredGeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    processed_at: Option<SystemTime>,
    #[serde(default)]
    attributes: Attributes,
}

impl From<StoredGeoPoint> for GeoPoint {
    fn from(stored: StoredGeoPoint) -> Self {
        Self {
            valid: stored.valid && in_range(stored.latitude, stored.longitude),
            latitude: stored.latitude,
            longitude: stored.longitude,
            processed_at: stored.processed_at,
            attributes: stored.attributes,
        }
    }
}

impl GeoPoint {
    /// Create an unprocessed point with no attributes.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            valid: false,
            processed_at: None,
            attributes: Attributes::new(),
        }
    }

    /// Create an unprocessed point carrying the given attributes.
    pub fn with_attributes(latitude: f64, longitude: f64, attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::new(latitude, longitude)
        }
    }

    /// Append (or replace) a single attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns `(latitude, longitude)`.
    pub fn lat_lon(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Mark the point as validated and stamp it with the processing time.
    ///
    /// Callers are responsible for checking the coordinates first: a point
    /// returned from here claims to be in range.
    pub fn mark_processed(mut self, at: SystemTime) -> Self {
        self.valid = true;
        self.processed_at = Some(at);
        self
    }

    /// Whether the point has gone through processing.
    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<&GeoPoint> for Point<f64> {
    fn from(point: &GeoPoint) -> Self {
        point.to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_point_is_unprocessed() {
        let p = GeoPoint::new(40.7128, -74.0060);
        assert!(!p.valid);
        assert!(!p.is_processed());
        assert!(p.attributes.is_empty());
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let p = GeoPoint::new(0.0, 0.0)
            .with_attribute("zeta", 1)
            .with_attribute("alpha", 2)
            .with_attribute("mid", "x");

        let keys: Vec<&str> = p.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_mark_processed() {
        let now = SystemTime::now();
        let p = GeoPoint::new(1.0, 2.0).mark_processed(now);
        assert!(p.valid);
        assert_eq!(p.processed_at, Some(now));
    }

    #[test]
    fn test_geo_point_conversion_swaps_axes() {
        let p = GeoPoint::new(51.5074, -0.1278);
        let gp: Point<f64> = (&p).into();
        assert_eq!(gp.x(), -0.1278);
        assert_eq!(gp.y(), 51.5074);

        let back = GeoPoint::from(gp);
        assert_eq!(back.lat_lon(), (51.5074, -0.1278));
    }

    #[test]
    fn test_deserialize_drops_valid_flag_out_of_range() {
        let forged: GeoPoint =
            serde_json::from_value(json!({ "latitude": 95.0, "longitude": 0.0, "valid": true }))
                .unwrap();
        assert!(!forged.valid);

        let bad_lon = json!({ "latitude": 10.0, "longitude": 200.0, "valid": true });
        assert!(!serde_json::from_value::<GeoPoint>(bad_lon).unwrap().valid);

        let ok: GeoPoint =
            serde_json::from_value(json!({ "latitude": 45.0, "longitude": -180.0, "valid": true }))
                .unwrap();
        assert!(ok.valid);
    }

    #[test]
    fn test_in_range() {
        assert!(in_range(90.0, -180.0));
        assert!(!in_range(90.1, 0.0));
        assert!(!in_range(0.0, f64::NAN));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let p = GeoPoint::new(10.0, 20.0);
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(
            value,
            json!({ "latitude": 10.0, "longitude": 20.0, "valid": false })
        );

        let with_attrs = p.with_attribute("name", "a");
        let json = serde_json::to_string(&with_attrs).unwrap();
        let decoded: GeoPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, with_attrs);
    }
}
