//! Batch processing engine for geographic point records.
//!
//! ## Features
//! - **Validation**: latitude/longitude range checks, `NaN` rejected
//! - **Distances**: Haversine great-circle kernel (spherical Earth, R = 6371 km)
//! - **Spatial grid**: uniform bucketing of points over a bounding box
//! - **Nearest neighbors**: radius-bounded k-nearest search, stable on ties
//! - **Chunked parallelism**: batches split across a bounded worker pool with
//!   per-chunk error containment
//!
//! ## Ordering
//! Sequential processing keeps input order. Parallel processing returns
//! items in chunk completion order; counts are always exact.
//!
//! ```rust
//! use geobatch::{GeoEngine, GeoPoint, ProcessingConfig};
//! use geobatch::compute::haversine;
//!
//! let engine = GeoEngine::new(ProcessingConfig::default().with_worker_count(2))?;
//!
//! let records = vec![
//!     GeoPoint::new(40.7128, -74.0060).with_attribute("name", "New York"),
//!     GeoPoint::new(51.5074, -0.1278).with_attribute("name", "London"),
//!     GeoPoint::new(f64::NAN, 0.0),
//! ];
//! let outcome = engine.process(&records);
//! assert_eq!(outcome.processed_count, 2);
//! assert_eq!(outcome.error_count, 1);
//!
//! let km = haversine(40.7128, -74.0060, 51.5074, -0.1278);
//! assert!((km - 5570.0).abs() < 5.0);
//! # Ok::<(), geobatch::GeoError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod processing;

pub use builder::GeoEngineBuilder;
pub use config::ProcessingConfig;
pub use engine::GeoEngine;
pub use error::{GeoError, Result};

pub use compute::spatial::{CellKey, SpatialGrid};
pub use compute::{batch_distance, find_neighbors, haversine, is_valid};
pub use processing::{BatchOutcome, ChunkStats, ParallelExecutor, RawRecord, Record};

pub use geo::{Point, Rect};

pub use geobatch_types::{
    Attributes, BoundingBox, ChunkResult, DistanceResult, GeoPoint, Neighbor, NeighborResult,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoEngine, GeoEngineBuilder, GeoError, ProcessingConfig, Result};

    pub use crate::{BoundingBox, GeoPoint, NeighborResult, SpatialGrid};

    pub use crate::compute::{batch_distance, find_neighbors, haversine, is_valid};

    pub use crate::processing::{
        BatchOutcome, Record, process_chunk, process_parallel, process_sequential,
    };
}
