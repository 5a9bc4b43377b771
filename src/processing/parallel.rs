//! Chunked batch execution on a bounded worker pool.
//!
//! A batch is split into contiguous chunks, each chunk is handed to
//! [`process_chunk`] on a dedicated rayon pool, and the per-chunk results
//! are merged into a [`BatchOutcome`]. Chunks share no mutable state; the
//! only synchronization is the collection of finished chunks.
//!
//! Under parallel execution the merged items follow chunk *completion*
//! order, so they are not guaranteed to match input order. Counts are
//! exact regardless. [`process_sequential`] keeps input order.

use crate::error::{GeoError, Result};
use crate::processing::chunk::process_chunk;
use crate::processing::record::Record;
use geobatch_types::point::GeoPoint;
use geobatch_types::result::ChunkResult;
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Provenance of one chunk within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub chunk_index: usize,
    pub item_count: usize,
    pub processed_count: usize,
    pub error_count: usize,
    /// The chunk's worker panicked; all its items count as errors.
    pub failed: bool,
}

/// Merged result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Valid, annotated points
    pub items: Vec<GeoPoint>,
    pub processed_count: usize,
    pub error_count: usize,
    /// Per-chunk statistics sorted by chunk index
    pub chunks: Vec<ChunkStats>,
    /// One `WorkerFailure` per chunk whose worker panicked
    pub failures: Vec<GeoError>,
}

impl BatchOutcome {
    /// Total input items accounted for (processed plus errors).
    pub fn total_count(&self) -> usize {
        self.processed_count + self.error_count
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn merge(outcomes: Vec<ChunkOutcome>) -> Self {
        let mut batch = BatchOutcome {
            chunks: Vec::with_capacity(outcomes.len()),
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                ChunkOutcome::Completed { result, item_count } => {
                    batch.chunks.push(ChunkStats {
                        chunk_index: result.chunk_index,
                        item_count,
                        processed_count: result.processed_count(),
                        error_count: result.error_count,
                        failed: false,
                    });
                    batch.error_count += result.error_count;
                    batch.items.extend(result.processed_items);
                }
                ChunkOutcome::Failed { error, item_count } => {
                    if let GeoError::WorkerFailure { chunk_index, .. } = &error {
                        batch.chunks.push(ChunkStats {
                            chunk_index: *chunk_index,
                            item_count,
                            processed_count: 0,
                            error_count: item_count,
                            failed: true,
                        });
                    }
                    batch.error_count += item_count;
                    batch.failures.push(error);
                }
            }
        }

        batch.processed_count = batch.items.len();
        batch.chunks.sort_by_key(|c| c.chunk_index);
        batch
    }
}

enum ChunkOutcome {
    Completed {
        result: ChunkResult,
        item_count: usize,
    },
    Failed {
        error: GeoError,
        item_count: usize,
    },
}

/// Chunk size actually used for a batch.
///
/// Targets about two chunks per worker (`ceil(len / (workers * 2))`, at
/// least 1) and never exceeds the requested size. More workers therefore
/// means smaller chunks.
///
/// # Examples
///
/// ```
/// use geobatch::processing::effective_chunk_size;
///
/// assert_eq!(effective_chunk_size(10_000, 1000, 8), 625);
/// assert_eq!(effective_chunk_size(10_000, 100, 8), 100);
/// assert_eq!(effective_chunk_size(3, 1000, 8), 1);
/// ```
pub fn effective_chunk_size(len: usize, requested: usize, worker_count: usize) -> usize {
    let balanced = len.div_ceil(worker_count.max(1) * 2).max(1);
    requested.min(balanced).max(1)
}

/// Bounded pool of worker threads for batch processing.
pub struct ParallelExecutor {
    pool: ThreadPool,
    worker_count: usize,
}

impl ParallelExecutor {
    /// Create an executor with exactly `worker_count` threads.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidConfig`] if `worker_count` is zero, or
    /// [`GeoError::WorkerPool`] if the threads cannot be spawned.
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(GeoError::InvalidConfig(
                "Worker count must be greater than zero".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("geobatch-worker-{}", i))
            .build()?;

        log::debug!("Started worker pool with {} threads", worker_count);
        Ok(Self { pool, worker_count })
    }

    /// Create an executor sized to the available logical processors.
    pub fn with_available_parallelism() -> Result<Self> {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Run a closure inside this executor's pool, so nested rayon calls use its threads.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Process a batch across the pool and block until every chunk is done.
    ///
    /// A panicking chunk is reported as a [`GeoError::WorkerFailure`] in
    /// [`BatchOutcome::failures`]. Its items are counted as errors and the
    /// other chunks are unaffected.
    pub fn process_parallel<T>(&self, data: &[T], chunk_size: usize) -> BatchOutcome
    where
        T: Record + Sync,
    {
        let size = effective_chunk_size(data.len(), chunk_size, self.worker_count);
        let completed = Mutex::new(Vec::with_capacity(data.len().div_ceil(size)));

        self.pool.install(|| {
            data.par_chunks(size)
                .enumerate()
                .for_each(|(chunk_index, chunk)| {
                    let outcome = run_chunk(chunk, chunk_index);
                    completed.lock().push(outcome);
                });
        });

        let batch = BatchOutcome::merge(completed.into_inner());
        log_summary("parallel", data.len(), &batch);
        batch
    }
}

impl std::fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("worker_count", &self.worker_count)
            .finish()
    }
}

/// Process a batch on a fresh pool of `worker_count` threads.
///
/// Convenience over [`ParallelExecutor`] for one-off runs.
pub fn process_parallel<T>(data: &[T], chunk_size: usize, worker_count: usize) -> Result<BatchOutcome>
where
    T: Record + Sync,
{
    Ok(ParallelExecutor::new(worker_count)?.process_parallel(data, chunk_size))
}

/// Process a batch chunk by chunk on the calling thread. Output keeps input order.
pub fn process_sequential<T: Record>(data: &[T], chunk_size: usize) -> BatchOutcome {
    let outcomes = data
        .chunks(chunk_size.max(1))
        .enumerate()
        .map(|(chunk_index, chunk)| run_chunk(chunk, chunk_index))
        .collect();

    let batch = BatchOutcome::merge(outcomes);
    log_summary("sequential", data.len(), &batch);
    batch
}

fn run_chunk<T: Record>(chunk: &[T], chunk_index: usize) -> ChunkOutcome {
    let item_count = chunk.len();
    match panic::catch_unwind(AssertUnwindSafe(|| process_chunk(chunk, chunk_index))) {
        Ok(result) => ChunkOutcome::Completed { result, item_count },
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            log::error!(
                "Chunk {} ({} items) failed: {}",
                chunk_index,
                item_count,
                reason
            );
            ChunkOutcome::Failed {
                error: GeoError::WorkerFailure {
                    chunk_index,
                    reason,
                },
                item_count,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_summary(mode: &str, input_len: usize, batch: &BatchOutcome) {
    log::info!(
        "Processed {} records ({}, {} chunks): {} valid, {} errors",
        input_len,
        mode,
        batch.chunks.len(),
        batch.processed_count,
        batch.error_count
    );
    if batch.has_failures() {
        log::error!("{} chunk(s) failed during processing", batch.failures.len());
    }
}
