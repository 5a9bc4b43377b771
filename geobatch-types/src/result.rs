use crate::point::GeoPoint;
use serde::{Deserialize, Serialize};

/// Round a kilometre distance to three decimal places (metre resolution).
pub fn round_km(km: f64) -> f64 {
    (km * 1000.0).round() / 1000.0
}

/// Distance between one pair of points from a batch.
///
/// `distance_km` is the display value rounded with [`round_km`]; the
/// unrounded value is kept for ranking and is available through
/// [`DistanceResult::exact_km`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceResult<'a> {
    pub from: &'a GeoPoint,
    pub to: &'a GeoPoint,
    pub distance_km: f64,
    pub index: usize,
    #[serde(skip)]
    exact_km: f64,
}

impl<'a> DistanceResult<'a> {
    pub fn new(from: &'a GeoPoint, to: &'a GeoPoint, index: usize, exact_km: f64) -> Self {
        Self {
            from,
            to,
            distance_km: round_km(exact_km),
            index,
            exact_km,
        }
    }

    /// Full-precision distance in kilometres.
    pub fn exact_km(&self) -> f64 {
        self.exact_km
    }
}

/// A reference point matched to a query, with its distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub reference: GeoPoint,
    pub distance_km: f64,
}

/// Nearest neighbors of one query point, closest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborResult {
    pub query: GeoPoint,
    pub neighbors: Vec<Neighbor>,
    pub count: usize,
}

impl NeighborResult {
    pub fn new(query: GeoPoint, neighbors: Vec<Neighbor>) -> Self {
        let count = neighbors.len();
        Self {
            query,
            neighbors,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// The closest neighbor, if any.
    pub fn nearest(&self) -> Option<&Neighbor> {
        self.neighbors.first()
    }
}

/// Output of processing a single chunk of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub processed_items: Vec<GeoPoint>,
    pub error_count: usize,
    pub chunk_index: usize,
}

impl ChunkResult {
    pub fn new(chunk_index: usize) -> Self {
        Self {
            chunk_index,
            ..Default::default()
        }
    }

    pub fn processed_count(&self) -> usize {
        self.processed_items.len()
    }
}
