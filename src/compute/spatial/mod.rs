pub mod grid;
pub use grid::{CellKey, MAX_GRID_SIZE, Neighborhood, SpatialGrid};

pub mod neighbors;
pub use neighbors::{find_neighbors, find_neighbors_parallel, nearest_in_grid};
