use crate::assemble::{Bucket, GroupKey};
use std::num::NonZeroUsize;

/// What happens to the undersized final chunk of a bucket.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OverflowPolicy {
    /// Emit the short chunk as-is.
    Strict,
    /// Pool short chunks from every bucket and chunk the pool once all buckets are done.
    Pooled,
}
impl OverflowPolicy {
    pub fn from_chunk_over_groups(chunk_over_groups: bool) -> Self {
        if chunk_over_groups {
            OverflowPolicy::Pooled
        } else {
            OverflowPolicy::Strict
        }
    }
}

/// Where a chunk's characters came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkSource {
    Bucket(GroupKey),
    Leftover,
}

/// A run of characters that becomes one subset and one stylesheet rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    pub source: ChunkSource,
    pub chars: Vec<char>,
}

/// Splits buckets into chunks of at most `chunk_size` characters.
///
/// Chunks are returned in emission order: bucket order, then any pooled leftovers.
pub fn plan(buckets: &[Bucket], chunk_size: NonZeroUsize, policy: OverflowPolicy) -> Vec<Chunk> {
    let size = chunk_size.get();
    let mut chunks = Vec::new();
    let mut leftover = Vec::new();

    for bucket in buckets {
        for part in bucket.chars.chunks(size) {
            if part.len() < size && policy == OverflowPolicy::Pooled {
                leftover.extend_from_slice(part);
                continue;
            }
            chunks.push(Chunk { source: ChunkSource::Bucket(bucket.key), chars: part.to_vec() });
        }
    }
    for part in leftover.chunks(size) {
        chunks.push(Chunk { source: ChunkSource::Leftover, chars: part.to_vec() });
    }

    chunks
}
