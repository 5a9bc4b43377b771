//! Per-chunk validation and annotation.

use crate::compute::validation::validate_point;
use crate::error::Result;
use crate::processing::record::Record;
use geobatch_types::point::GeoPoint;
use geobatch_types::result::ChunkResult;
use std::time::SystemTime;

/// Dropped items logged individually per chunk; the rest are only counted.
const MAX_LOGGED_DROPS: usize = 5;

/// Validate and annotate every item of one chunk.
///
/// Items that fail to decode or have out-of-range coordinates are dropped
/// and counted in `error_count`. Surviving items are marked valid and
/// stamped with the processing time, in input order. Nothing outside the
/// chunk is touched.
///
/// # Examples
///
/// ```
/// use geobatch::GeoPoint;
/// use geobatch::processing::process_chunk;
///
/// let items = vec![GeoPoint::new(40.7128, -74.0060), GeoPoint::new(95.0, 0.0)];
/// let result = process_chunk(&items, 0);
///
/// assert_eq!(result.processed_items.len(), 1);
/// assert_eq!(result.error_count, 1);
/// assert!(result.processed_items[0].valid);
/// ```
pub fn process_chunk<T: Record>(items: &[T], chunk_index: usize) -> ChunkResult {
    let mut result = ChunkResult::new(chunk_index);
    result.processed_items.reserve(items.len());

    for (offset, item) in items.iter().enumerate() {
        match annotate(item) {
            Ok(point) => result.processed_items.push(point),
            Err(e) if e.is_item_error() => {
                result.error_count += 1;
                if result.error_count <= MAX_LOGGED_DROPS {
                    log::warn!("Chunk {}: dropping item {}: {}", chunk_index, offset, e);
                }
            }
            Err(e) => {
                result.error_count += 1;
                log::error!(
                    "Chunk {}: unexpected failure on item {}: {}",
                    chunk_index,
                    offset,
                    e
                );
            }
        }
    }

    if result.error_count > MAX_LOGGED_DROPS {
        log::warn!(
            "Chunk {}: {} further dropped items not logged",
            chunk_index,
            result.error_count - MAX_LOGGED_DROPS
        );
    }

    log::debug!(
        "Chunk {} done: {} processed, {} errors",
        chunk_index,
        result.processed_items.len(),
        result.error_count
    );

    result
}

fn annotate<T: Record>(item: &T) -> Result<GeoPoint> {
    let point = item.to_geo_point()?;
    validate_point(&point)?;
    Ok(point.mark_processed(SystemTime::now()))
}
