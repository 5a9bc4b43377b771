//! High-level entry point tying processing, indexing and search together.

use crate::builder::GeoEngineBuilder;
use crate::compute::distance::batch_distance;
use crate::compute::spatial::grid::SpatialGrid;
use crate::compute::spatial::neighbors::{find_neighbors, find_neighbors_parallel};
use crate::compute::validation::is_valid;
use crate::config::ProcessingConfig;
use crate::error::{GeoError, Result};
use crate::processing::parallel::{BatchOutcome, ParallelExecutor, process_sequential};
use crate::processing::record::{RawRecord, Record};
use geobatch_types::bbox::BoundingBox;
use geobatch_types::point::GeoPoint;
use geobatch_types::result::{DistanceResult, NeighborResult};

/// Configured processing engine.
///
/// Owns a validated [`ProcessingConfig`] and a worker pool sized from it.
/// The engine itself keeps no per-run state: every call returns its
/// results and counters explicitly.
///
/// ```rust
/// use geobatch::{GeoEngine, GeoPoint};
///
/// let engine = GeoEngine::builder().max_neighbors(2).build()?;
///
/// let batch = vec![
///     GeoPoint::new(40.7128, -74.0060).with_attribute("name", "NYC"),
///     GeoPoint::new(999.0, 0.0),
///     GeoPoint::new(40.6782, -73.9442).with_attribute("name", "Brooklyn"),
/// ];
/// let outcome = engine.process(&batch);
/// assert_eq!(outcome.processed_count, 2);
/// assert_eq!(outcome.error_count, 1);
///
/// let grid = engine.build_grid_auto(outcome.items.clone())?;
/// assert_eq!(grid.len(), 2);
///
/// let queries = vec![GeoPoint::new(40.7306, -73.9356)];
/// let results = engine.nearest(&outcome.items, &queries);
/// assert_eq!(results[0].count, 2);
/// # Ok::<(), geobatch::GeoError>(())
/// ```
#[derive(Debug)]
pub struct GeoEngine {
    config: ProcessingConfig,
    executor: ParallelExecutor,
}

impl GeoEngine {
    /// Create an engine from a configuration.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidConfig`] if the configuration does not validate,
    /// or [`GeoError::WorkerPool`] if the worker threads cannot be started.
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate().map_err(GeoError::InvalidConfig)?;
        let executor = ParallelExecutor::new(config.effective_worker_count())?;
        Ok(Self { config, executor })
    }

    pub fn builder() -> GeoEngineBuilder {
        GeoEngineBuilder::new()
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.executor.worker_count()
    }

    /// Validate and annotate a batch.
    ///
    /// Batches below `parallel_threshold`, or engines with one worker, run
    /// sequentially and keep input order. Larger batches are spread over
    /// the pool and come back in chunk completion order.
    pub fn process<T>(&self, data: &[T]) -> BatchOutcome
    where
        T: Record + Sync,
    {
        if data.len() < self.config.parallel_threshold || self.executor.worker_count() == 1 {
            process_sequential(data, self.config.chunk_size)
        } else {
            self.executor.process_parallel(data, self.config.chunk_size)
        }
    }

    /// [`GeoEngine::process`] for decoded attribute records.
    pub fn process_records(&self, records: &[RawRecord]) -> BatchOutcome {
        self.process(records)
    }

    /// Index points into a grid over `bounding_box` at the configured resolution.
    ///
    /// Points with invalid coordinates are skipped and logged.
    pub fn build_grid<I>(&self, points: I, bounding_box: BoundingBox) -> Result<SpatialGrid>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut grid = SpatialGrid::new(bounding_box, self.config.grid_size)?;
        let rejected = grid.insert_valid(points);
        if rejected > 0 {
            log::warn!("{} points with invalid coordinates left out of the grid", rejected);
        }
        log::debug!(
            "Built {}x{} grid: {} points in {} occupied cells",
            grid.grid_size(),
            grid.grid_size(),
            grid.len(),
            grid.occupied_cells()
        );
        Ok(grid)
    }

    /// Like [`GeoEngine::build_grid`], with the bounding box derived from the valid points.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidBoundingBox`] if the valid points do not span a
    /// non-degenerate box (fewer than two distinct latitudes or longitudes).
    pub fn build_grid_auto(&self, points: Vec<GeoPoint>) -> Result<SpatialGrid> {
        let valid: Vec<GeoPoint> = points
            .into_iter()
            .filter(|p| is_valid(p.latitude, p.longitude))
            .collect();

        let bbox = BoundingBox::from_points(&valid).ok_or_else(|| {
            GeoError::InvalidBoundingBox(format!(
                "cannot derive a bounding box with non-zero area from {} valid points",
                valid.len()
            ))
        })?;

        self.build_grid(valid, bbox)
    }

    /// Nearest references for every query using the configured radius and cap.
    ///
    /// Large query sets are searched on the worker pool; results are the
    /// same either way.
    pub fn nearest(&self, references: &[GeoPoint], queries: &[GeoPoint]) -> Vec<NeighborResult> {
        let max_distance_km = self.config.max_distance_km;
        let max_neighbors = self.config.max_neighbors;

        if queries.len() < self.config.parallel_threshold || self.executor.worker_count() == 1 {
            find_neighbors(references, queries, max_distance_km, max_neighbors)
        } else {
            self.executor.install(|| {
                find_neighbors_parallel(references, queries, max_distance_km, max_neighbors)
            })
        }
    }

    /// Pairwise distances, see [`crate::compute::distance::batch_distance`].
    pub fn batch_distance<'a>(
        &self,
        from: &'a [GeoPoint],
        to: &'a [GeoPoint],
    ) -> Result<Vec<DistanceResult<'a>>> {
        batch_distance(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(threshold: usize) -> GeoEngine {
        GeoEngine::new(
            ProcessingConfig::default()
                .with_worker_count(2)
                .with_chunk_size(16)
                .with_parallel_threshold(threshold),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ProcessingConfig {
            grid_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            GeoEngine::new(config),
            Err(GeoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_grid_is_rejected_before_allocation() {
        let config = ProcessingConfig::from_json(r#"{ "grid_size": 4000000, "worker_count": 1 }"#);
        assert!(config.is_err());

        let config = ProcessingConfig {
            grid_size: 4_000_000,
            worker_count: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            GeoEngine::new(config),
            Err(GeoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_process_modes_agree() {
        let data: Vec<GeoPoint> = (0..200)
            .map(|i| GeoPoint::new((i % 200) as f64 - 100.0, 0.0))
            .collect();

        let seq = engine(usize::MAX).process(&data);
        let par = engine(0).process(&data);
        assert_eq!(seq.processed_count, 181);
        assert_eq!(seq.error_count, 19);
        assert_eq!(par.processed_count, seq.processed_count);
        assert_eq!(par.error_count, seq.error_count);
    }

    #[test]
    fn test_build_grid_skips_invalid() {
        let e = engine(1000);
        let bbox = BoundingBox::new(90.0, -90.0, 180.0, -180.0);
        let grid = e
            .build_grid(
                vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(f64::NAN, 0.0)],
                bbox,
            )
            .unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.grid_size(), 10);
    }

    #[test]
    fn test_build_grid_auto_degenerate() {
        let e = engine(1000);
        let result = e.build_grid_auto(vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(200.0, 5.0)]);
        assert!(matches!(result, Err(GeoError::InvalidBoundingBox(_))));
    }

    #[test]
    fn test_nearest_modes_agree() {
        let refs: Vec<GeoPoint> = (0..50)
            .map(|i| GeoPoint::new(i as f64 * 0.1, i as f64 * 0.2))
            .collect();
        let queries: Vec<GeoPoint> = (0..20)
            .map(|i| GeoPoint::new(i as f64 * 0.25, 1.0))
            .collect();

        let seq = engine(usize::MAX).nearest(&refs, &queries);
        let par = engine(0).nearest(&refs, &queries);
        assert_eq!(seq, par);
        assert!(seq.iter().all(|r| r.count <= 10));
    }
}
