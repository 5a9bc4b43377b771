//! Uniform rectangular grid over a bounding box.
//!
//! The grid partitions a [`BoundingBox`] into `grid_size × grid_size` equal
//! cells and buckets points by cell. It is built once per session and never
//! resized; changing the resolution means building a new grid.

use crate::compute::validation::is_valid;
use crate::error::{GeoError, Result};
use geobatch_types::bbox::BoundingBox;
use geobatch_types::point::GeoPoint;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Largest accepted `grid_size`. Cells are allocated eagerly, so the grid
/// holds up to `MAX_GRID_SIZE²` (about a million) buckets.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Cell address as `(cell_x, cell_y)`: column from the west edge, row from the south edge.
pub type CellKey = (u32, u32);

/// A cell and its in-range neighbors. Never more than nine entries.
pub type Neighborhood = SmallVec<[CellKey; 9]>;

/// Uniform spatial grid.
///
/// Every inserted point lands in exactly one cell. Points outside the
/// bounding box are clamped into the nearest edge cell rather than
/// dropped. The grid does not validate coordinates: filter with
/// [`crate::compute::validation::is_valid`] or use [`SpatialGrid::insert_valid`].
///
/// # Examples
///
/// ```
/// use geobatch::{BoundingBox, GeoPoint, SpatialGrid};
///
/// let bbox = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
/// let mut grid = SpatialGrid::new(bbox, 10)?;
///
/// assert_eq!(grid.insert(GeoPoint::new(0.5, 0.5)), (0, 0));
/// assert_eq!(grid.insert(GeoPoint::new(10.0, 10.0)), (9, 9));
/// // Outside the box: clamped, not dropped
/// assert_eq!(grid.insert(GeoPoint::new(-5.0, 25.0)), (9, 0));
/// assert_eq!(grid.len(), 3);
/// # Ok::<(), geobatch::GeoError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    bounding_box: BoundingBox,
    grid_size: u32,
    cell_width: f64,
    cell_height: f64,
    cells: FxHashMap<CellKey, Vec<GeoPoint>>,
    len: usize,
}

impl SpatialGrid {
    /// Create an empty grid with every cell allocated up front.
    ///
    /// # Errors
    ///
    /// - [`GeoError::InvalidBoundingBox`] if `north <= south`, `east <= west`
    ///   or any edge is not finite.
    /// - [`GeoError::InvalidGridSize`] if `grid_size` is zero or above [`MAX_GRID_SIZE`].
    pub fn new(bounding_box: BoundingBox, grid_size: u32) -> Result<Self> {
        let BoundingBox {
            north,
            south,
            east,
            west,
        } = bounding_box;

        if ![north, south, east, west].iter().all(|v| v.is_finite()) {
            return Err(GeoError::InvalidBoundingBox(format!(
                "edges must be finite: {:?}",
                bounding_box
            )));
        }
        if north <= south {
            return Err(GeoError::InvalidBoundingBox(format!(
                "north ({}) must be greater than south ({})",
                north, south
            )));
        }
        if east <= west {
            return Err(GeoError::InvalidBoundingBox(format!(
                "east ({}) must be greater than west ({})",
                east, west
            )));
        }
        if !(1..=MAX_GRID_SIZE).contains(&grid_size) {
            return Err(GeoError::InvalidGridSize(grid_size));
        }

        let side = grid_size as usize;
        let mut cells = FxHashMap::with_capacity_and_hasher(side * side, Default::default());
        for x in 0..grid_size {
            for y in 0..grid_size {
                cells.insert((x, y), Vec::new());
            }
        }

        Ok(Self {
            bounding_box,
            grid_size,
            cell_width: bounding_box.width() / grid_size as f64,
            cell_height: bounding_box.height() / grid_size as f64,
            cells,
            len: 0,
        })
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Cell width in degrees of longitude.
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Cell height in degrees of latitude.
    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Total number of cells (`grid_size²`).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of points inserted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The cell a coordinate falls into, clamped to the grid.
    pub fn cell_of(&self, latitude: f64, longitude: f64) -> CellKey {
        let x = ((longitude - self.bounding_box.west) / self.cell_width).floor();
        let y = ((latitude - self.bounding_box.south) / self.cell_height).floor();
        (self.clamp_index(x), self.clamp_index(y))
    }

    // NaN maps to 0 and +inf to the last index
    fn clamp_index(&self, raw: f64) -> u32 {
        (raw.max(0.0) as u32).min(self.grid_size - 1)
    }

    /// Insert a point and return the cell it was assigned to.
    pub fn insert(&mut self, point: GeoPoint) -> CellKey {
        let key = self.cell_of(point.latitude, point.longitude);
        self.cells.entry(key).or_default().push(point);
        self.len += 1;
        key
    }

    /// Insert every point from an iterator.
    pub fn extend<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        for point in points {
            self.insert(point);
        }
    }

    /// Insert only points with valid coordinates. Returns how many were rejected.
    pub fn insert_valid<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut rejected = 0;
        for point in points {
            if is_valid(point.latitude, point.longitude) {
                self.insert(point);
            } else {
                log::warn!(
                    "Skipping grid insert of invalid coordinate ({}, {})",
                    point.latitude,
                    point.longitude
                );
                rejected += 1;
            }
        }
        rejected
    }

    /// Points stored in a cell, or `None` if the key lies outside the grid.
    pub fn cell(&self, key: CellKey) -> Option<&[GeoPoint]> {
        self.cells.get(&key).map(Vec::as_slice)
    }

    /// The raw cell mapping. Every in-range key is present, possibly empty.
    pub fn cells(&self) -> &FxHashMap<CellKey, Vec<GeoPoint>> {
        &self.cells
    }

    /// The given cell followed by its in-range neighbors (up to 8), row by row.
    pub fn neighborhood(&self, (x, y): CellKey) -> Neighborhood {
        let max = self.grid_size as i64 - 1;
        let mut keys = Neighborhood::new();
        keys.push((x, y));

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if (0..=max).contains(&nx) && (0..=max).contains(&ny) {
                    keys.push((nx as u32, ny as u32));
                }
            }
        }
        keys
    }

    /// Points in the coordinate's cell and its adjacent cells.
    pub fn points_near(&self, latitude: f64, longitude: f64) -> impl Iterator<Item = &GeoPoint> {
        self.neighborhood(self.cell_of(latitude, longitude))
            .into_iter()
            .filter_map(move |key| self.cells.get(&key))
            .flatten()
    }

    /// All points, cell by cell in column-major order, insertion order within a cell.
    pub fn iter(&self) -> impl Iterator<Item = &GeoPoint> {
        (0..self.grid_size)
            .flat_map(move |x| (0..self.grid_size).map(move |y| (x, y)))
            .filter_map(move |key| self.cells.get(&key))
            .flatten()
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|c| !c.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(size: u32) -> SpatialGrid {
        SpatialGrid::new(BoundingBox::new(10.0, 0.0, 10.0, 0.0), size).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        let flipped = BoundingBox::new(0.0, 10.0, 10.0, 0.0);
        assert!(matches!(
            SpatialGrid::new(flipped, 4),
            Err(GeoError::InvalidBoundingBox(_))
        ));

        let zero_width = BoundingBox::new(10.0, 0.0, 5.0, 5.0);
        assert!(matches!(
            SpatialGrid::new(zero_width, 4),
            Err(GeoError::InvalidBoundingBox(_))
        ));

        let nan = BoundingBox::new(f64::NAN, 0.0, 10.0, 0.0);
        assert!(matches!(
            SpatialGrid::new(nan, 4),
            Err(GeoError::InvalidBoundingBox(_))
        ));

        let ok = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert!(matches!(
            SpatialGrid::new(ok, 0),
            Err(GeoError::InvalidGridSize(0))
        ));
    }

    #[test]
    fn test_new_rejects_oversized_grid() {
        let bbox = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert!(matches!(
            SpatialGrid::new(bbox, MAX_GRID_SIZE + 1),
            Err(GeoError::InvalidGridSize(n)) if n == MAX_GRID_SIZE + 1
        ));
        assert!(matches!(
            SpatialGrid::new(bbox, 4_000_000),
            Err(GeoError::InvalidGridSize(4_000_000))
        ));
    }

    #[test]
    fn test_cells_are_allocated_eagerly() {
        let grid = unit_grid(5);
        assert_eq!(grid.cell_count(), 25);
        assert_eq!(grid.cell_width(), 2.0);
        assert_eq!(grid.cell_height(), 2.0);
        assert!(grid.cells().values().all(Vec::is_empty));
        assert!(grid.cell((4, 4)).is_some());
        assert!(grid.cell((5, 0)).is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_cell_assignment() {
        let grid = unit_grid(10);
        assert_eq!(grid.cell_of(0.0, 0.0), (0, 0));
        assert_eq!(grid.cell_of(0.99, 0.99), (0, 0));
        assert_eq!(grid.cell_of(1.0, 1.0), (1, 1));
        assert_eq!(grid.cell_of(5.5, 2.5), (2, 5));
    }

    #[test]
    fn test_boundary_and_outside_points_are_clamped() {
        let mut grid = unit_grid(10);
        assert_eq!(grid.insert(GeoPoint::new(10.0, 10.0)), (9, 9));
        assert_eq!(grid.insert(GeoPoint::new(0.0, 10.0)), (9, 0));
        assert_eq!(grid.insert(GeoPoint::new(-50.0, -50.0)), (0, 0));
        assert_eq!(grid.insert(GeoPoint::new(50.0, 50.0)), (9, 9));
        assert_eq!(grid.insert(GeoPoint::new(f64::NAN, 5.0)), (5, 0));
        assert_eq!(grid.len(), 5);
        assert_eq!(grid.iter().count(), 5);
    }

    #[test]
    fn test_enumeration_matches_insert_count() {
        let mut grid = unit_grid(7);
        let points: Vec<GeoPoint> = (0..200)
            .map(|i| GeoPoint::new((i % 13) as f64 * 0.8, (i % 17) as f64 * 0.6))
            .collect();
        grid.extend(points);

        let total: usize = grid.cells().values().map(Vec::len).sum();
        assert_eq!(total, 200);
        assert_eq!(grid.len(), 200);
        assert_eq!(grid.iter().count(), 200);
    }

    #[test]
    fn test_insert_valid_rejects_out_of_range() {
        let bbox = BoundingBox::new(90.0, -90.0, 180.0, -180.0);
        let mut grid = SpatialGrid::new(bbox, 4).unwrap();
        let rejected = grid.insert_valid(vec![
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(91.0, 10.0),
            GeoPoint::new(f64::NAN, 0.0),
        ]);
        assert_eq!(rejected, 2);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_insertion_order_within_cell() {
        let mut grid = unit_grid(2);
        grid.insert(GeoPoint::new(1.0, 1.0).with_attribute("n", 1));
        grid.insert(GeoPoint::new(2.0, 2.0).with_attribute("n", 2));
        let cell = grid.cell((0, 0)).unwrap();
        assert_eq!(cell.len(), 2);
        assert_eq!(cell[0].attribute("n"), Some(&serde_json::json!(1)));
        assert_eq!(cell[1].attribute("n"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_neighborhood() {
        let grid = unit_grid(5);

        let corner = grid.neighborhood((0, 0));
        assert_eq!(corner.len(), 4);
        assert_eq!(corner[0], (0, 0));

        let edge = grid.neighborhood((2, 0));
        assert_eq!(edge.len(), 6);

        let center = grid.neighborhood((2, 2));
        assert_eq!(center.len(), 9);
        assert!(!center.spilled());

        let single = unit_grid(1).neighborhood((0, 0));
        assert_eq!(single.as_slice(), &[(0, 0)]);
    }

    #[test]
    fn test_points_near() {
        let mut grid = unit_grid(5);
        grid.insert(GeoPoint::new(1.0, 1.0)); // (0, 0)
        grid.insert(GeoPoint::new(3.0, 3.0)); // (1, 1)
        grid.insert(GeoPoint::new(9.0, 9.0)); // (4, 4)

        assert_eq!(grid.points_near(0.5, 0.5).count(), 2);
        assert_eq!(grid.points_near(9.5, 9.5).count(), 1);
        assert_eq!(grid.points_near(5.0, 5.0).count(), 1);
    }
}
