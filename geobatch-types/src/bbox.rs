use crate::point::GeoPoint;
use geo::Rect;
use serde::{Deserialize, Serialize};

/// A rectangular latitude/longitude region.
///
/// Edges are in decimal degrees. The box never wraps across the antimeridian:
/// a well-formed box has `north > south` and `east > west`.
///
/// # Examples
///
/// ```
/// use geobatch_types::bbox::BoundingBox;
///
/// // Roughly Manhattan
/// let bbox = BoundingBox::new(40.88, 40.70, -73.91, -74.02);
/// assert!(bbox.is_well_formed());
/// assert!(bbox.contains(40.7580, -73.9855));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four edges. No checks are made here.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Whether `north > south` and `east > west`.
    ///
    /// `NaN` edges make the box malformed.
    pub fn is_well_formed(&self) -> bool {
        self.north > self.south && self.east > self.west
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Inclusive containment test.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south
            && latitude <= self.north
            && longitude >= self.west
            && longitude <= self.east
    }

    /// Tightest box around the given points.
    ///
    /// Points with non-finite coordinates are ignored. Returns `None` when no
    /// finite point exists or when all points share a latitude or a longitude,
    /// since such a box would have zero area.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut bbox: Option<Self> = None;

        for p in points {
            if !p.latitude.is_finite() || !p.longitude.is_finite() {
                continue;
            }
            bbox = Some(match bbox {
                None => Self::new(p.latitude, p.latitude, p.longitude, p.longitude),
                Some(b) => Self::new(
                    b.north.max(p.latitude),
                    b.south.min(p.latitude),
                    b.east.max(p.longitude),
                    b.west.min(p.longitude),
                ),
            });
        }

        bbox.filter(Self::is_well_formed)
    }

    /// Convert to a `geo::Rect` (x = longitude, y = latitude).
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            geo::coord! { x: self.west, y: self.south },
            geo::coord! { x: self.east, y: self.north },
        )
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.max().y, rect.min().y, rect.max().x, rect.min().x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        assert!(BoundingBox::new(10.0, 0.0, 10.0, 0.0).is_well_formed());
        assert!(!BoundingBox::new(0.0, 10.0, 10.0, 0.0).is_well_formed());
        assert!(!BoundingBox::new(10.0, 0.0, 0.0, 0.0).is_well_formed());
        assert!(!BoundingBox::new(f64::NAN, 0.0, 10.0, 0.0).is_well_formed());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = BoundingBox::new(10.0, 0.0, 20.0, 5.0);
        assert!(bbox.contains(10.0, 20.0));
        assert!(bbox.contains(0.0, 5.0));
        assert!(!bbox.contains(10.1, 10.0));
        assert!(!bbox.contains(5.0, 4.9));
    }

    #[test]
    fn test_from_points() {
        let points = vec![
            GeoPoint::new(40.7128, -74.0060),
            GeoPoint::new(51.5074, -0.1278),
            GeoPoint::new(f64::NAN, 3.0),
            GeoPoint::new(35.6895, 139.6917),
        ];
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bbox.north, 51.5074);
        assert_eq!(bbox.south, 35.6895);
        assert_eq!(bbox.east, 139.6917);
        assert_eq!(bbox.west, -74.0060);
    }

    #[test]
    fn test_from_points_degenerate() {
        assert!(BoundingBox::from_points(&Vec::<GeoPoint>::new()).is_none());
        let single = vec![GeoPoint::new(1.0, 1.0)];
        assert!(BoundingBox::from_points(&single).is_none());
        let same_lat = vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(1.0, 2.0)];
        assert!(BoundingBox::from_points(&same_lat).is_none());
    }

    #[test]
    fn test_rect_round_trip() {
        let bbox = BoundingBox::new(45.0, 35.0, -70.0, -80.0);
        let rect = bbox.to_rect();
        assert_eq!(rect.min().x, -80.0);
        assert_eq!(rect.max().y, 45.0);
        assert_eq!(BoundingBox::from(rect), bbox);
    }
}
