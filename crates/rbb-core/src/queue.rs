//! Contiguous block queues
//!
//! A block queue is the longest run of ready blocks, starting at the oldest
//! block still visible to consumers, whose bytes form one flat span of the
//! backing buffer. Consumers drain it in one go (e.g. a single DMA transfer
//! or `write` call) instead of block by block.
//!
//! ```text
//!          tail                         head
//!  +-----------+---------------+--------+----------+--------+
//!  |  block3   |     empty     | block1 |  block2  |fragment|
//!  +-----------+---------------+--------+----------+--------+
//!                              |<- queue length ->|
//! ```
//!
//! Queued blocks leave the consumer-visible scan but keep their bytes
//! reserved until [`crate::RingBlockBuffer::queue_free`].

use crate::id::BlockId;
use crate::list::BlockList;
use crate::pool::DescriptorPool;

/// Run of contiguous ready blocks found by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub first: BlockId,
    pub count: usize,
    pub offset: usize,
    pub len: usize,
}

impl Run {
    pub const EMPTY: Run = Run {
        first: BlockId::NONE,
        count: 0,
        offset: 0,
        len: 0,
    };
}

/// Find the run `queue_get` would drain
///
/// Starts at the first block not already in a queue, which must be `Put`.
/// Extends while the next block is `Put`, starts exactly where the previous
/// one ended, and keeps the total within `max_len`.
pub(crate) fn scan_run(pool: &DescriptorPool<'_>, list: &BlockList, max_len: usize) -> Run {
    let mut run = Run::EMPTY;
    let mut prev_end = 0;

    for (id, desc) in list.iter(pool) {
        if desc.is_queued() {
            if run.count == 0 {
                continue;
            }
            break;
        }
        if !desc.status().is_ready() {
            break;
        }
        if run.count > 0 && desc.offset() != prev_end {
            break;
        }
        let total = match run.len.checked_add(desc.len()) {
            Some(total) if total <= max_len => total,
            _ => break,
        };

        if run.count == 0 {
            run.first = id;
            run.offset = desc.offset();
        }
        run.count += 1;
        run.len = total;
        prev_end = desc.end();
    }

    run
}

/// Batch of contiguous blocks drained by `queue_get`
///
/// Owns its blocks until passed to `queue_free`. An empty queue (nothing
/// was ready) owns nothing and may simply be dropped.
#[must_use = "a non-empty block queue must be released with queue_free"]
#[derive(Debug, PartialEq, Eq)]
pub struct BlockQueue {
    owner: usize,
    first: BlockId,
    count: usize,
    offset: usize,
    len: usize,
}

impl BlockQueue {
    pub(crate) const fn from_run(owner: usize, run: Run) -> Self {
        Self {
            owner,
            first: run.first,
            count: run.count,
            offset: run.offset,
            len: run.len,
        }
    }

    /// Total bytes across all blocks in the queue
    ///
    /// Summed once by `queue_get` and cached, so this is O(1) rather than a
    /// walk over the blocks.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of blocks in the queue
    #[inline]
    pub const fn block_count(&self) -> usize {
        self.count
    }

    /// Start of the contiguous span (first block's offset, 0 when empty)
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// First block of the run
    #[inline]
    pub const fn first(&self) -> Option<BlockId> {
        self.first.to_option()
    }

    #[inline]
    pub(crate) const fn owner(&self) -> usize {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::BlockDescriptor;
    use crate::pool::Slots;
    use crate::state::BlockStatus;

    /// Build a list from (offset, len, status, queued)
    fn build(blocks: &[(usize, usize, BlockStatus, bool)]) -> (DescriptorPool<'static>, BlockList) {
        let slots = vec![BlockDescriptor::UNUSED; blocks.len()].into_boxed_slice();
        let mut pool = DescriptorPool::new(Slots::Owned(slots));
        let mut list = BlockList::new();
        for &(offset, len, status, queued) in blocks {
            let id = pool.claim().unwrap();
            let desc = pool.get_mut(id);
            desc.reserve(offset, len);
            desc.status = status;
            desc.queued = queued;
            list.push_back(&mut pool, id);
        }
        (pool, list)
    }

    use BlockStatus::{Get, Inited, Put};

    #[test]
    fn test_run_of_adjacent_ready_blocks() {
        let (pool, list) = build(&[(0, 6, Put, false), (6, 5, Put, false), (11, 2, Inited, false)]);
        let run = scan_run(&pool, &list, 20);
        assert_eq!(run.first, BlockId::new(0));
        assert_eq!(run.count, 2);
        assert_eq!(run.offset, 0);
        assert_eq!(run.len, 11);
    }

    #[test]
    fn test_run_requires_ready_head() {
        let (pool, list) = build(&[(0, 4, Inited, false), (4, 4, Put, false)]);
        assert_eq!(scan_run(&pool, &list, 100), Run::EMPTY);

        let (pool, list) = build(&[(0, 4, Get, false), (4, 4, Put, false)]);
        assert_eq!(scan_run(&pool, &list, 100), Run::EMPTY);
    }

    #[test]
    fn test_run_respects_length_limit() {
        let (pool, list) = build(&[(0, 4, Put, false), (4, 4, Put, false), (8, 4, Put, false)]);
        let run = scan_run(&pool, &list, 11);
        assert_eq!(run.count, 2);
        assert_eq!(run.len, 8);

        // exact fit
        assert_eq!(scan_run(&pool, &list, 12).count, 3);

        // head alone too large
        assert_eq!(scan_run(&pool, &list, 3), Run::EMPTY);
    }

    #[test]
    fn test_run_stops_at_wrap() {
        // block3 wrapped to offset 0 after block2 at the end
        let (pool, list) = build(&[(8, 4, Put, false), (12, 4, Put, false), (0, 4, Put, false)]);
        let run = scan_run(&pool, &list, 100);
        assert_eq!(run.count, 2);
        assert_eq!(run.offset, 8);
        assert_eq!(run.len, 8);
    }

    #[test]
    fn test_run_stops_at_gap() {
        // middle block freed out of order leaves a hole at [4, 8)
        let (pool, list) = build(&[(0, 4, Put, false), (8, 4, Put, false)]);
        let run = scan_run(&pool, &list, 100);
        assert_eq!(run.count, 1);
        assert_eq!(run.len, 4);
    }

    #[test]
    fn test_run_skips_queued_prefix() {
        let (pool, list) = build(&[(0, 4, Get, true), (4, 4, Put, false), (8, 2, Put, false)]);
        let run = scan_run(&pool, &list, 100);
        assert_eq!(run.first, BlockId::new(1));
        assert_eq!(run.count, 2);
        assert_eq!(run.offset, 4);
        assert_eq!(run.len, 6);
    }
}
