//! Processing configuration.
//!
//! All tunables of a processing run live in [`ProcessingConfig`]. It can be
//! built in code with the `with_*` methods or loaded from JSON (and TOML with
//! the `toml` feature).
use crate::compute::spatial::MAX_GRID_SIZE;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Tunables for batch processing, grid indexing and neighbor search.
///
/// # Example
///
/// ```rust
/// use geobatch::ProcessingConfig;
///
/// let config = ProcessingConfig::default();
/// assert_eq!(config.grid_size, 10);
/// assert_eq!(config.chunk_size, 1000);
///
/// let json = r#"{ "grid_size": 32, "max_neighbors": 3 }"#;
/// let config = ProcessingConfig::from_json(json).unwrap();
/// assert_eq!(config.grid_size, 32);
/// assert_eq!(config.max_distance_km, 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Cells per side of the spatial grid, at most [`MAX_GRID_SIZE`]
    #[serde(default = "ProcessingConfig::default_grid_size")]
    pub grid_size: u32,

    /// Requested number of records per chunk. The executor may pick smaller
    /// chunks to spread work across workers.
    #[serde(default = "ProcessingConfig::default_chunk_size")]
    pub chunk_size: usize,

    /// Worker threads for parallel processing. `None` uses every logical CPU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_count: Option<usize>,

    /// Neighbors further than this are discarded
    #[serde(default = "ProcessingConfig::default_max_distance_km")]
    pub max_distance_km: f64,

    /// Upper bound on neighbors returned per query
    #[serde(default = "ProcessingConfig::default_max_neighbors")]
    pub max_neighbors: usize,

    /// Batches smaller than this are processed sequentially
    #[serde(default = "ProcessingConfig::default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl ProcessingConfig {
    const fn default_grid_size() -> u32 {
        10
    }

    const fn default_chunk_size() -> usize {
        1000
    }

    const fn default_max_distance_km() -> f64 {
        1000.0
    }

    const fn default_max_neighbors() -> usize {
        10
    }

    const fn default_parallel_threshold() -> usize {
        1000
    }

    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        assert!(grid_size > 0, "Grid size must be greater than zero");
        assert!(
            grid_size <= MAX_GRID_SIZE,
            "Grid size must not exceed {}",
            MAX_GRID_SIZE
        );
        self.grid_size = grid_size;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Chunk size must be greater than zero");
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_worker_count(mut self, workers: usize) -> Self {
        assert!(workers > 0, "Worker count must be greater than zero");
        if workers > 256 {
            log::warn!(
                "Worker count of {} is unusually large; each worker is an OS thread",
                workers
            );
        }
        self.worker_count = Some(workers);
        self
    }

    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = km;
        self
    }

    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Number of workers to use, resolving `None` to the available parallelism.
    pub fn effective_worker_count(&self) -> usize {
        self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size == 0 {
            return Err("Grid size must be greater than zero".to_string());
        }

        if self.grid_size > MAX_GRID_SIZE {
            return Err(format!(
                "Grid size must not exceed {}, got {}",
                MAX_GRID_SIZE, self.grid_size
            ));
        }

        if self.chunk_size == 0 {
            return Err("Chunk size must be greater than zero".to_string());
        }

        if self.worker_count == Some(0) {
            return Err("Worker count must be greater than zero".to_string());
        }

        if !self.max_distance_km.is_finite() || self.max_distance_km < 0.0 {
            return Err(format!(
                "Max distance must be a finite, non-negative number of kilometres, got {}",
                self.max_distance_km
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: ProcessingConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: ProcessingConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            chunk_size: Self::default_chunk_size(),
            worker_count: None,
            max_distance_km: Self::default_max_distance_km(),
            max_neighbors: Self::default_max_neighbors(),
            parallel_threshold: Self::default_parallel_threshold(),
        }
    }
}
