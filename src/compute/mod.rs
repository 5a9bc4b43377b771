//! Compute layer: coordinate checks, distances and spatial indexing.
//!
//! This module holds the pure algorithms. It is independent of how records
//! are batched or scheduled, which lives in [`crate::processing`].
//! It provides:
//! - Coordinate validation
//! - The Haversine distance kernel
//! - The uniform spatial grid and nearest-neighbor search

pub mod distance;
pub mod spatial;
pub mod validation;

pub use distance::{EARTH_RADIUS_KM, batch_distance, distance_km, haversine};
pub use spatial::{SpatialGrid, find_neighbors, find_neighbors_parallel, nearest_in_grid};
pub use validation::is_valid;
