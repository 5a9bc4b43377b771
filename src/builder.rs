//! Engine builder for flexible configuration
//!
//! Collects settings on top of a base [`ProcessingConfig`] and validates
//! them once, when the engine is built.

use crate::config::ProcessingConfig;
use crate::engine::GeoEngine;
use crate::error::Result;

/// Builder for [`GeoEngine`].
#[derive(Debug, Clone, Default)]
pub struct GeoEngineBuilder {
    config: ProcessingConfig,
}

impl GeoEngineBuilder {
    /// Create a builder starting from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ProcessingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grid_size(mut self, grid_size: u32) -> Self {
        self.config.grid_size = grid_size;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Use a fixed number of worker threads instead of one per logical CPU.
    pub fn worker_count(mut self, workers: usize) -> Self {
        self.config.worker_count = Some(workers);
        self
    }

    pub fn max_distance_km(mut self, km: f64) -> Self {
        self.config.max_distance_km = km;
        self
    }

    pub fn max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.config.max_neighbors = max_neighbors;
        self
    }

    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    /// Validate the configuration and start the worker pool.
    pub fn build(self) -> Result<GeoEngine> {
        GeoEngine::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;

    #[test]
    fn test_builder_default() {
        let builder = GeoEngineBuilder::new();
        assert_eq!(builder.config, ProcessingConfig::default());
    }

    #[test]
    fn test_builder_settings() {
        let engine = GeoEngineBuilder::new()
            .grid_size(25)
            .chunk_size(128)
            .worker_count(3)
            .max_distance_km(12.5)
            .max_neighbors(4)
            .parallel_threshold(10)
            .build()
            .unwrap();

        let config = engine.config();
        assert_eq!(config.grid_size, 25);
        assert_eq!(config.chunk_size, 128);
        assert_eq!(config.max_distance_km, 12.5);
        assert_eq!(config.max_neighbors, 4);
        assert_eq!(config.parallel_threshold, 10);
        assert_eq!(engine.worker_count(), 3);
    }

    #[test]
    fn test_builder_validates_on_build() {
        assert!(matches!(
            GeoEngineBuilder::new().chunk_size(0).build(),
            Err(GeoError::InvalidConfig(_))
        ));
        assert!(matches!(
            GeoEngineBuilder::new().worker_count(0).build(),
            Err(GeoError::InvalidConfig(_))
        ));
        assert!(matches!(
            GeoEngineBuilder::new().max_distance_km(f64::NAN).build(),
            Err(GeoError::InvalidConfig(_))
        ));
    }
}
