//! Batch ingestion: record decoding, per-chunk validation, and the worker pool.

pub mod chunk;
pub mod parallel;
pub mod record;

pub use chunk::process_chunk;
pub use parallel::{
    BatchOutcome, ChunkStats, ParallelExecutor, effective_chunk_size, process_parallel,
    process_sequential,
};
pub use record::{RawRecord, Record, decode_record};
