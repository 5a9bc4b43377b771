//! Radius-bounded k-nearest-neighbor search.
//!
//! The search is a brute-force cross product: every query is compared with
//! every reference point, costing `O(|references| × |queries|)` distance
//! evaluations. Accepted neighbors satisfy `distance <= max_distance_km`,
//! are sorted ascending by exact distance, and equal distances keep the
//! order of the reference slice.

use crate::compute::distance::distance_km;
use crate::compute::spatial::grid::SpatialGrid;
use geobatch_types::point::GeoPoint;
use geobatch_types::result::{Neighbor, NeighborResult};
use rayon::prelude::*;

/// Find up to `max_neighbors` references within `max_distance_km` of each query.
///
/// Returns exactly one [`NeighborResult`] per query, in query order, even
/// when a query has no neighbors. Distances are reported unrounded.
///
/// # Examples
///
/// ```
/// use geobatch::GeoPoint;
/// use geobatch::compute::spatial::find_neighbors;
///
/// let references = vec![
///     GeoPoint::new(40.6782, -73.9442).with_attribute("name", "Brooklyn"),
///     GeoPoint::new(40.7306, -73.9356).with_attribute("name", "Queens"),
///     GeoPoint::new(34.0522, -118.2437).with_attribute("name", "LA"),
/// ];
/// let queries = vec![GeoPoint::new(40.7128, -74.0060)];
///
/// let results = find_neighbors(&references, &queries, 100.0, 10);
/// assert_eq!(results.len(), 1);
/// // LA is far outside the radius
/// assert_eq!(results[0].count, 2);
/// assert!(results[0].neighbors[0].distance_km <= results[0].neighbors[1].distance_km);
/// ```
pub fn find_neighbors(
    references: &[GeoPoint],
    queries: &[GeoPoint],
    max_distance_km: f64,
    max_neighbors: usize,
) -> Vec<NeighborResult> {
    queries
        .iter()
        .map(|query| neighbors_of(query, references, max_distance_km, max_neighbors))
        .collect()
}

/// Parallel variant of [`find_neighbors`] that spreads queries over the
/// current rayon pool. Output is identical, including order.
pub fn find_neighbors_parallel(
    references: &[GeoPoint],
    queries: &[GeoPoint],
    max_distance_km: f64,
    max_neighbors: usize,
) -> Vec<NeighborResult> {
    queries
        .par_iter()
        .map(|query| neighbors_of(query, references, max_distance_km, max_neighbors))
        .collect()
}

/// Search every point held by a grid.
///
/// Candidates are visited in the grid's enumeration order (cell by cell,
/// insertion order within a cell), which decides ties at equal distance.
pub fn nearest_in_grid(
    grid: &SpatialGrid,
    queries: &[GeoPoint],
    max_distance_km: f64,
    max_neighbors: usize,
) -> Vec<NeighborResult> {
    let references: Vec<&GeoPoint> = grid.iter().collect();
    queries
        .iter()
        .map(|query| {
            neighbors_of(
                query,
                references.iter().copied(),
                max_distance_km,
                max_neighbors,
            )
        })
        .collect()
}

fn neighbors_of<'a, I>(
    query: &GeoPoint,
    references: I,
    max_distance_km: f64,
    max_neighbors: usize,
) -> NeighborResult
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    if max_neighbors == 0 {
        return NeighborResult::new(query.clone(), Vec::new());
    }

    // NaN distances fail the comparison and are dropped here
    let mut candidates: Vec<(&GeoPoint, f64)> = references
        .into_iter()
        .map(|reference| (reference, distance_km(query, reference)))
        .filter(|&(_, d)| d <= max_distance_km)
        .collect();

    // Stable: equal distances keep reference order
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.truncate(max_neighbors);

    let neighbors = candidates
        .into_iter()
        .map(|(reference, distance_km)| Neighbor {
            reference: reference.clone(),
            distance_km,
        })
        .collect();

    NeighborResult::new(query.clone(), neighbors)
}
