//! Ring block buffer
//!
//! A fixed byte buffer carved into variable-length blocks that are handed
//! out in ring order. Producers `allocate`, fill and `put` blocks; consumers
//! `get` (or `queue_get`) them, read the bytes in place and `free` them.
//! Nothing is ever copied between producer and consumer.
//!
//! Every operation that touches block metadata runs inside one short
//! critical section (interrupts masked through `I`, then a spin lock), so a
//! ring block buffer may be shared between threads and interrupt handlers.
//! No operation blocks, allocates or logs while inside it.
//!
//! # Example
//!
//! ```
//! use rbb_core::RingBlockBuffer;
//!
//! let rbb: RingBlockBuffer = RingBlockBuffer::create(64, 8).unwrap();
//!
//! let mut block = rbb.allocate(5).unwrap();
//! rbb.block_bytes_mut(&mut block).copy_from_slice(b"hello");
//! rbb.put(block);
//!
//! let block = rbb.get().unwrap();
//! assert_eq!(rbb.block_bytes(&block), b"hello");
//! rbb.free(block);
//! ```

use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use core::slice;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::alloc::{Layout, Span};
use crate::critical::CriticalCell;
use crate::descriptor::{BlockDescriptor, BlockInfo};
use crate::error::{AllocTarget, RbbError, RbbResult};
use crate::handle::BlockHandle;
use crate::id::BlockId;
use crate::list::BlockList;
use crate::pool::{DescriptorPool, Slots};
use crate::queue::{scan_run, BlockQueue};
use crate::state::BlockStatus;
use crate::traits::{IrqControl, NoIrq};

/// Source of ring identities; never reused within a process
static NEXT_RBB: AtomicUsize = AtomicUsize::new(1);

/// Block metadata guarded by the critical section
struct RingState<'a> {
    pool: DescriptorPool<'a>,
    list: BlockList,
}

impl<'a> RingState<'a> {
    /// Current free-space shape, from the oldest and newest live blocks
    ///
    /// Blocks held in outstanding queues still count, so their bytes stay
    /// reserved until `queue_free`.
    fn layout(&self) -> Layout {
        let ends = match (self.list.head(), self.list.tail()) {
            (Some(head), Some(tail)) => Some((
                Span::from(self.pool.get(head)),
                Span::from(self.pool.get(tail)),
            )),
            _ => None,
        };
        Layout::classify(ends)
    }
}

/// Point-in-time counters for a ring block buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RbbStats {
    /// Backing buffer size in bytes
    pub capacity: usize,
    /// Descriptor pool size
    pub max_blocks: usize,
    /// Blocks in any state other than `Unused`
    pub live_blocks: usize,
    /// Bytes covered by live blocks
    pub used_bytes: usize,
    /// Blocks in `Put` state waiting for a consumer
    pub ready_blocks: usize,
    /// Blocks currently held by outstanding block queues
    pub queued_blocks: usize,
    /// Largest request `allocate` would accept right now (ignoring pool exhaustion)
    pub largest_free: usize,
}

/// Ring block buffer
///
/// `'a` is the lifetime of caller-provided storage (`'static` for buffers
/// built by [`RingBlockBuffer::create`]). `I` masks interrupts around each
/// critical section; the default [`NoIrq`] relies on the spin lock alone.
pub struct RingBlockBuffer<'a, I: IrqControl = NoIrq> {
    /// Stamped into every handle and queue this ring issues
    tag: usize,
    base: NonNull<u8>,
    capacity: usize,
    max_blocks: usize,

    /// Backing buffer was allocated by `create` and is freed on drop
    owns_buffer: bool,

    state: CriticalCell<RingState<'a>, I>,
    _buf: PhantomData<&'a mut [u8]>,
}

// Safety: the backing bytes are only reached through handles, and each live
// window has exactly one handle. All metadata is behind the critical section.
unsafe impl<'a, I: IrqControl> Send for RingBlockBuffer<'a, I> {}
unsafe impl<'a, I: IrqControl> Sync for RingBlockBuffer<'a, I> {}

impl<I: IrqControl> RingBlockBuffer<'static, I> {
    /// Allocate the backing buffer and descriptor pool from the heap
    ///
    /// Returns `InvalidConfig` for zero sizes and `NoMemory` if either
    /// allocation fails. Nothing is leaked on failure.
    pub fn create(capacity: usize, max_blocks: usize) -> RbbResult<Self> {
        if capacity == 0 {
            return Err(RbbError::InvalidConfig("capacity must be at least 1"));
        }
        if max_blocks == 0 {
            return Err(RbbError::InvalidConfig("max_blocks must be at least 1"));
        }
        if max_blocks >= BlockId::NONE.as_usize() {
            return Err(RbbError::InvalidConfig("max_blocks exceeds the block id range"));
        }

        let buf = try_boxed(capacity, 0u8).ok_or(AllocTarget::BackingBuffer)?;
        let slots = try_boxed(max_blocks, BlockDescriptor::UNUSED).ok_or(AllocTarget::DescriptorPool)?;

        let base = NonNull::from(Box::leak(buf)).cast::<u8>();
        crate::kdebug!(
            "rbb: created capacity={} max_blocks={} at {:p}",
            capacity,
            max_blocks,
            base
        );
        Ok(Self::from_parts(base, capacity, true, Slots::Owned(slots)))
    }
}

impl<'a, I: IrqControl> RingBlockBuffer<'a, I> {
    /// Build a ring block buffer over caller-owned storage
    ///
    /// Every slot of `pool` is reset to `Unused`. Both slices stay borrowed
    /// for the life of the ring block buffer. Performs no allocation.
    ///
    /// # Panics
    ///
    /// If either slice is empty, or `pool` has more slots than block ids.
    pub fn init(buf: &'a mut [u8], pool: &'a mut [BlockDescriptor]) -> Self {
        assert!(!buf.is_empty(), "ring block buffer needs a non-empty backing buffer");
        assert!(!pool.is_empty(), "ring block buffer needs at least one descriptor");

        let capacity = buf.len();
        let base = NonNull::from(buf).cast::<u8>();
        Self::from_parts(base, capacity, false, Slots::Borrowed(pool))
    }

    fn from_parts(base: NonNull<u8>, capacity: usize, owns_buffer: bool, slots: Slots<'a>) -> Self {
        let pool = DescriptorPool::new(slots);
        let max_blocks = pool.capacity();
        Self {
            tag: NEXT_RBB.fetch_add(1, Ordering::Relaxed),
            base,
            capacity,
            max_blocks,
            owns_buffer,
            state: CriticalCell::new(RingState {
                pool,
                list: BlockList::new(),
            }),
            _buf: PhantomData,
        }
    }

    /// Tear down, releasing heap storage from `create`
    ///
    /// Handles still outstanding are dead: every later ring has a different
    /// tag, so passing one to it panics, even when that ring reuses this
    /// one's memory.
    pub fn destroy(self) {
        if self.owns_buffer {
            crate::kdebug!(
                "rbb: destroy capacity={} max_blocks={} at {:p}",
                self.capacity,
                self.max_blocks,
                self.base
            );
        }
        drop(self);
    }

    /// Backing buffer size in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Descriptor pool size
    #[inline]
    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    /// Identity stamped into every handle and queue
    #[inline]
    fn tag(&self) -> usize {
        self.tag
    }

    #[inline]
    fn check_owner(&self, owner: usize) {
        assert_eq!(owner, self.tag, "handle belongs to another ring block buffer");
    }

    /// Owner check plus slot range check for a handle about to index the pool
    #[inline]
    fn check_block(&self, pool: &DescriptorPool<'_>, block: &BlockHandle) {
        self.check_owner(block.owner());
        assert!(pool.is_valid(block.id()), "block id {} out of range", block.id());
    }

    // ========================================================================
    // Producer side
    // ========================================================================

    /// Reserve `size` contiguous bytes
    ///
    /// Returns `None` when the pool is exhausted or no free region is large
    /// enough. A full ring is an ordinary outcome under backpressure.
    ///
    /// # Panics
    ///
    /// If `size` is zero.
    pub fn allocate(&self, size: usize) -> Option<BlockHandle> {
        assert!(size > 0, "zero-sized block");

        let mut cs = self.state.enter();
        if cs.list.len() >= cs.pool.capacity() || cs.pool.is_exhausted() {
            return None;
        }
        let offset = cs.layout().place(self.capacity, size)?;

        let RingState { pool, list } = &mut *cs;
        let id = pool.claim()?;
        pool.get_mut(id).reserve(offset, size);
        list.push_back(pool, id);

        Some(BlockHandle::new(id, offset, size, self.tag()))
    }

    /// Publish a filled block to consumers
    ///
    /// # Panics
    ///
    /// If the block is not `Inited` or came from another ring block buffer.
    pub fn put(&self, block: BlockHandle) {
        let mut cs = self.state.enter();
        self.check_block(&cs.pool, &block);
        let desc = cs.pool.get_mut(block.id());
        assert_eq!(desc.status, BlockStatus::Inited, "put on a block that is not INITED");
        desc.status = BlockStatus::Put;
    }

    /// Allocate a block, copy `data` into it and publish it
    ///
    /// Returns `false` when the ring has no room for `data`.
    ///
    /// # Panics
    ///
    /// If `data` is empty.
    pub fn write_block(&self, data: &[u8]) -> bool {
        let Some(mut block) = self.allocate(data.len()) else {
            return false;
        };
        self.block_bytes_mut(&mut block).copy_from_slice(data);
        self.put(block);
        true
    }

    // ========================================================================
    // Consumer side
    // ========================================================================

    /// Take the oldest ready block
    pub fn get(&self) -> Option<BlockHandle> {
        let mut cs = self.state.enter();
        let (id, offset, len) = cs
            .list
            .iter(&cs.pool)
            .find(|(_, desc)| !desc.is_queued() && desc.status().is_ready())
            .map(|(id, desc)| (id, desc.offset(), desc.len()))?;

        cs.pool.get_mut(id).status = BlockStatus::Get;
        Some(BlockHandle::new(id, offset, len, self.tag()))
    }

    /// Release a block in any live state
    ///
    /// Bytes are not cleared. Freeing blocks in allocation order keeps the
    /// free space in one piece.
    ///
    /// # Panics
    ///
    /// If the block is `Unused` or came from another ring block buffer.
    pub fn free(&self, block: BlockHandle) {
        let mut cs = self.state.enter();
        let RingState { pool, list } = &mut *cs;
        self.check_block(pool, &block);
        assert!(pool.get(block.id()).status().is_live(), "free on an UNUSED block");

        let linked = list.unlink(pool, block.id());
        debug_assert!(linked, "live block missing from the list");
        pool.release(block.id());
    }

    /// Read every ready block through `f`, oldest first, freeing each after
    ///
    /// `f` runs outside the critical section. Returns the number of blocks
    /// consumed.
    pub fn drain<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&[u8]),
    {
        let mut drained = 0;
        while let Some(block) = self.get() {
            f(self.block_bytes(&block));
            self.free(block);
            drained += 1;
        }
        drained
    }

    // ========================================================================
    // Block queues
    // ========================================================================

    /// Take the longest contiguous run of ready blocks, up to `max_len` bytes
    ///
    /// The run starts at the oldest block not already queued, which must be
    /// `Put`; otherwise the queue is empty. Each following block must also be
    /// `Put` and start exactly where the previous one ended. Blocks in the
    /// run move to `Get` and are hidden from further `get`/`queue_get` calls
    /// until the queue is freed.
    pub fn queue_get(&self, max_len: usize) -> BlockQueue {
        let mut cs = self.state.enter();
        let run = scan_run(&cs.pool, &cs.list, max_len);

        let mut cur = run.first;
        for _ in 0..run.count {
            let desc = cs.pool.get_mut(cur);
            desc.status = BlockStatus::Get;
            desc.queued = true;
            cur = desc.next;
        }

        BlockQueue::from_run(self.tag(), run)
    }

    /// Free every block of a queue, in order
    ///
    /// # Panics
    ///
    /// If the queue came from another ring block buffer or its blocks are
    /// no longer queued.
    pub fn queue_free(&self, queue: BlockQueue) {
        self.check_owner(queue.owner());
        let Some(first) = queue.first() else {
            return;
        };

        let mut cs = self.state.enter();
        let RingState { pool, list } = &mut *cs;
        let freed = list.unlink_run(pool, first, queue.block_count(), |pool, id| {
            let desc = pool.get(id);
            assert!(
                desc.is_queued() && desc.status() == BlockStatus::Get,
                "queue_free on a block that is not queued"
            );
            pool.release(id);
        });
        assert_eq!(freed, queue.block_count(), "block queue no longer linked");
    }

    /// Bytes `queue_get` would return with no length limit
    pub fn next_queue_len(&self) -> usize {
        let cs = self.state.enter();
        scan_run(&cs.pool, &cs.list, usize::MAX).len
    }

    // ========================================================================
    // Zero-copy access
    // ========================================================================

    /// Raw pointer to a block's first byte, for DMA descriptors and FFI
    pub fn block_ptr(&self, block: &BlockHandle) -> *mut u8 {
        self.check_owner(block.owner());
        // Safety: offset < capacity for every live block
        unsafe { self.base.as_ptr().add(block.offset()) }
    }

    /// Read a block in place
    pub fn block_bytes<'s>(&'s self, block: &'s BlockHandle) -> &'s [u8] {
        let ptr = self.block_ptr(block);
        // Safety: the window lies inside the buffer and is disjoint from every
        // other live block; the handle is its only claim
        unsafe { slice::from_raw_parts(ptr, block.len()) }
    }

    /// Write a block in place
    pub fn block_bytes_mut<'s>(&'s self, block: &'s mut BlockHandle) -> &'s mut [u8] {
        let ptr = self.block_ptr(block);
        // Safety: as for block_bytes, and the handle is borrowed mutably
        unsafe { slice::from_raw_parts_mut(ptr, block.len()) }
    }

    /// Raw pointer to the start of a queue's span
    pub fn queue_ptr(&self, queue: &BlockQueue) -> *const u8 {
        self.check_owner(queue.owner());
        // Safety: offset is 0 for an empty queue, otherwise a live block's start
        unsafe { self.base.as_ptr().add(queue.offset()) }
    }

    /// Read a whole queue as one flat span
    pub fn queue_bytes<'s>(&'s self, queue: &'s BlockQueue) -> &'s [u8] {
        let ptr = self.queue_ptr(queue);
        // Safety: queued blocks are byte-adjacent, so the span is exactly
        // their union, and nothing else can reach it until queue_free
        unsafe { slice::from_raw_parts(ptr, queue.len()) }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Lifecycle state of a block
    pub fn status(&self, block: &BlockHandle) -> BlockStatus {
        let cs = self.state.enter();
        self.check_block(&cs.pool, block);
        cs.pool.get(block.id()).status()
    }

    /// Snapshot counters
    pub fn stats(&self) -> RbbStats {
        let cs = self.state.enter();
        let mut stats = RbbStats {
            capacity: self.capacity,
            max_blocks: self.max_blocks,
            live_blocks: cs.list.len(),
            largest_free: cs.layout().largest_free(self.capacity),
            ..RbbStats::default()
        };
        for (_, desc) in cs.list.iter(&cs.pool) {
            stats.used_bytes += desc.len();
            if desc.is_queued() {
                stats.queued_blocks += 1;
            } else if desc.status().is_ready() {
                stats.ready_blocks += 1;
            }
        }
        stats
    }

    /// Copy live block metadata into `out`, oldest first
    ///
    /// Returns the number of entries written, at most `out.len()`.
    pub fn snapshot(&self, out: &mut [BlockInfo]) -> usize {
        let cs = self.state.enter();
        let mut written = 0;
        for ((id, desc), slot) in cs.list.iter(&cs.pool).zip(out.iter_mut()) {
            *slot = BlockInfo::from_descriptor(id, desc);
            written += 1;
        }
        written
    }

    /// Live block metadata, oldest first
    pub fn blocks(&self) -> Vec<BlockInfo> {
        let mut out = vec![BlockInfo::default(); self.max_blocks];
        let n = self.snapshot(&mut out);
        out.truncate(n);
        out
    }
}

impl<'a, I: IrqControl> Drop for RingBlockBuffer<'a, I> {
    fn drop(&mut self) {
        if self.owns_buffer {
            // Safety: base/capacity came from the boxed slice leaked in create
            unsafe {
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                    self.base.as_ptr(),
                    self.capacity,
                )));
            }
        }
    }
}

/// Fallible boxed slice of `n` copies of `fill`
fn try_boxed<T: Clone>(n: usize, fill: T) -> Option<Box<[T]>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n).ok()?;
    v.resize(n, fill);
    Some(v.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize, max_blocks: usize) -> RingBlockBuffer<'static> {
        RingBlockBuffer::create(capacity, max_blocks).unwrap()
    }

    #[test]
    fn test_create_rejects_zero_sizes() {
        let err = RingBlockBuffer::<NoIrq>::create(0, 4).err().unwrap();
        assert!(matches!(err, RbbError::InvalidConfig(_)));

        let err = RingBlockBuffer::<NoIrq>::create(16, 0).err().unwrap();
        assert!(matches!(err, RbbError::InvalidConfig(_)));
    }

    #[test]
    fn test_create_out_of_memory() {
        let err = RingBlockBuffer::<NoIrq>::create(usize::MAX, 4).err().unwrap();
        assert_eq!(err, RbbError::NoMemory(AllocTarget::BackingBuffer));
    }

    #[test]
    fn test_init_borrowed_storage() {
        let mut buf = [0u8; 16];
        let mut pool = [BlockDescriptor::UNUSED; 4];
        {
            let rbb: RingBlockBuffer = RingBlockBuffer::init(&mut buf, &mut pool);
            assert_eq!(rbb.capacity(), 16);
            assert_eq!(rbb.max_blocks(), 4);
            assert!(rbb.write_block(b"abc"));
            assert_eq!(rbb.stats().ready_blocks, 1);
        }
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(pool[0].status(), BlockStatus::Put);
    }

    #[test]
    fn test_round_trip() {
        let rbb = ring(16, 4);

        let a = rbb.allocate(6).unwrap();
        assert_eq!((a.offset(), a.len()), (0, 6));
        let b = rbb.allocate(5).unwrap();
        assert_eq!((b.offset(), b.len()), (6, 5));

        rbb.put(a);
        rbb.put(b);

        let q = rbb.queue_get(20);
        assert_eq!(q.block_count(), 2);
        assert_eq!(q.len(), 11);
        assert_eq!(q.offset(), 0);
        assert_eq!(rbb.queue_ptr(&q), rbb.base.as_ptr() as *const u8);
        rbb.queue_free(q);

        assert_eq!(rbb.stats().live_blocks, 0);
        let whole = rbb.allocate(16).unwrap();
        assert_eq!(whole.offset(), 0);
        rbb.free(whole);
    }

    #[test]
    fn test_wraparound_after_drain() {
        let rbb = ring(10, 4);
        let a = rbb.allocate(6).unwrap();
        rbb.free(a);

        let b = rbb.allocate(8).unwrap();
        assert_eq!(b.offset(), 0);
        rbb.free(b);
    }

    #[test]
    fn test_wraparound_before_head() {
        let rbb = ring(10, 4);
        let a = rbb.allocate(6).unwrap();
        let b = rbb.allocate(3).unwrap();
        assert_eq!(b.offset(), 6);
        rbb.free(a);

        // 1 byte after the tail, 6 before the head
        let c = rbb.allocate(5).unwrap();
        assert_eq!(c.offset(), 0);

        // Wrapped: only [5, 6) is free
        assert!(rbb.allocate(2).is_none());
        let d = rbb.allocate(1).unwrap();
        assert_eq!(d.offset(), 5);

        rbb.free(b);
        rbb.free(c);
        rbb.free(d);
    }

    #[test]
    fn test_after_tail_wins() {
        let rbb = ring(20, 4);
        let a = rbb.allocate(5).unwrap();
        let b = rbb.allocate(5).unwrap();
        rbb.free(a);

        // 5 free before the head, 10 after the tail
        let c = rbb.allocate(5).unwrap();
        assert_eq!(c.offset(), 10);

        // exact fit after the tail
        let d = rbb.allocate(5).unwrap();
        assert_eq!(d.offset(), 15);

        rbb.free(b);
        rbb.free(c);
        rbb.free(d);
    }

    #[test]
    fn test_exhaustion_by_slots() {
        let rbb = ring(64, 2);
        let a = rbb.allocate(1).unwrap();
        let b = rbb.allocate(1).unwrap();
        assert!(rbb.allocate(1).is_none());

        rbb.free(a);
        let c = rbb.allocate(1).unwrap();
        rbb.free(b);
        rbb.free(c);
    }

    #[test]
    fn test_exhaustion_by_bytes() {
        let rbb = ring(8, 4);
        assert!(rbb.allocate(9).is_none());
        let a = rbb.allocate(8).unwrap();
        assert!(rbb.allocate(1).is_none());
        rbb.free(a);
    }

    #[test]
    fn test_get_returns_oldest_ready() {
        let rbb = ring(32, 4);
        let a = rbb.allocate(4).unwrap();
        assert!(rbb.write_block(b"bbbb"));
        assert!(rbb.write_block(b"cc"));

        let got = rbb.get().unwrap();
        assert_eq!(got.offset(), 4);
        assert_eq!(rbb.block_bytes(&got), b"bbbb");
        assert_eq!(rbb.status(&got), BlockStatus::Get);

        let next = rbb.get().unwrap();
        assert_eq!(rbb.block_bytes(&next), b"cc");
        assert!(rbb.get().is_none());

        rbb.free(a);
        rbb.free(got);
        rbb.free(next);
    }

    #[test]
    fn test_status_transitions() {
        let rbb = ring(16, 2);
        let a = rbb.allocate(4).unwrap();
        assert_eq!(rbb.status(&a), BlockStatus::Inited);
        rbb.put(a);
        let a = rbb.get().unwrap();
        assert_eq!(rbb.status(&a), BlockStatus::Get);
        rbb.free(a);
    }

    #[test]
    #[should_panic(expected = "not INITED")]
    fn test_put_after_get_panics() {
        let rbb = ring(16, 2);
        assert!(rbb.write_block(b"x"));
        let a = rbb.get().unwrap();
        rbb.put(a);
    }

    #[test]
    #[should_panic(expected = "another ring block buffer")]
    fn test_foreign_handle_panics() {
        let one = ring(16, 2);
        let two = ring(16, 2);
        let a = one.allocate(4).unwrap();
        two.free(a);
    }

    #[test]
    #[should_panic(expected = "zero-sized")]
    fn test_zero_size_panics() {
        let rbb = ring(16, 2);
        let _ = rbb.allocate(0);
    }

    #[test]
    fn test_empty_is_idempotent() {
        let rbb = ring(16, 4);
        let a = rbb.allocate(4).unwrap();
        let before = rbb.stats();

        for _ in 0..3 {
            assert!(rbb.get().is_none());
            let q = rbb.queue_get(16);
            assert!(q.is_empty());
            assert_eq!(q.len(), 0);
            rbb.queue_free(q);
            assert_eq!(rbb.next_queue_len(), 0);
        }
        assert_eq!(rbb.stats(), before);
        rbb.free(a);
    }

    #[test]
    fn test_queue_bytes_are_contiguous() {
        let rbb = ring(16, 4);
        assert!(rbb.write_block(b"hello "));
        assert!(rbb.write_block(b"world"));
        assert_eq!(rbb.next_queue_len(), 11);

        let q = rbb.queue_get(usize::MAX);
        assert_eq!(rbb.queue_bytes(&q), b"hello world");

        // queued blocks are invisible to consumers but keep their bytes
        assert!(rbb.get().is_none());
        assert_eq!(rbb.next_queue_len(), 0);
        assert_eq!(rbb.stats().queued_blocks, 2);
        assert_eq!(rbb.stats().largest_free, 5);

        rbb.queue_free(q);
        assert_eq!(rbb.stats().live_blocks, 0);
    }

    #[test]
    fn test_queue_stops_at_inited() {
        let rbb = ring(16, 4);
        assert!(rbb.write_block(b"aa"));
        let pending = rbb.allocate(2).unwrap();
        assert!(rbb.write_block(b"cc"));

        let q = rbb.queue_get(16);
        assert_eq!(q.block_count(), 1);
        assert_eq!(rbb.queue_bytes(&q), b"aa");

        // next consumer skips the queued prefix and stalls on the pending block
        assert_eq!(rbb.next_queue_len(), 0);
        let got = rbb.get().unwrap();
        assert_eq!(rbb.block_bytes(&got), b"cc");

        rbb.queue_free(q);
        rbb.free(got);
        rbb.free(pending);
    }

    #[test]
    fn test_queue_respects_max_len() {
        let rbb = ring(16, 4);
        assert!(rbb.write_block(b"aaaa"));
        assert!(rbb.write_block(b"bbbb"));

        let q = rbb.queue_get(3);
        assert!(q.is_empty());

        let q = rbb.queue_get(7);
        assert_eq!(rbb.queue_bytes(&q), b"aaaa");

        let q2 = rbb.queue_get(7);
        assert_eq!(rbb.queue_bytes(&q2), b"bbbb");

        rbb.queue_free(q);
        rbb.queue_free(q2);
        assert_eq!(rbb.stats().live_blocks, 0);
    }

    #[test]
    fn test_queue_bytes_stay_reserved() {
        let rbb = ring(8, 4);
        assert!(rbb.write_block(b"abcd"));
        let q = rbb.queue_get(8);

        // only [4, 8) may be handed out while the queue is held
        let a = rbb.allocate(4).unwrap();
        assert_eq!(a.offset(), 4);
        assert!(rbb.allocate(1).is_none());

        rbb.queue_free(q);
        rbb.free(a);
    }

    #[test]
    fn test_drain() {
        let rbb = ring(32, 8);
        for msg in [&b"one"[..], b"two", b"three"] {
            assert!(rbb.write_block(msg));
        }
        let mut seen = Vec::new();
        assert_eq!(rbb.drain(|bytes| seen.extend_from_slice(bytes)), 3);
        assert_eq!(seen, b"onetwothree");
        assert_eq!(rbb.stats().live_blocks, 0);
    }

    #[test]
    fn test_blocks_snapshot() {
        let rbb = ring(32, 4);
        assert!(rbb.write_block(b"xyz"));
        let pending = rbb.allocate(2).unwrap();

        let blocks = rbb.blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!((blocks[0].offset, blocks[0].len, blocks[0].status), (0, 3, BlockStatus::Put));
        assert_eq!((blocks[1].offset, blocks[1].end()), (3, 5));
        assert_eq!(blocks[1].status, BlockStatus::Inited);

        let mut one = [BlockInfo::default(); 1];
        assert_eq!(rbb.snapshot(&mut one), 1);
        assert_eq!(one[0].id, blocks[0].id);

        rbb.free(pending);
    }

    /// Handle from a dropped ring, next to a live block of a fresh ring
    fn stale_and_live() -> (BlockHandle, RingBlockBuffer<'static>, BlockHandle) {
        let old = ring(64, 4);
        let stale = old.allocate(32).unwrap();
        drop(old);

        let rbb = ring(64, 4);
        let mut live = rbb.allocate(32).unwrap();
        rbb.block_bytes_mut(&mut live).fill(0xAA);
        (stale, rbb, live)
    }

    #[test]
    #[should_panic(expected = "another ring block buffer")]
    fn test_stale_handle_put_panics() {
        let (stale, rbb, _live) = stale_and_live();
        rbb.put(stale);
    }

    #[test]
    #[should_panic(expected = "another ring block buffer")]
    fn test_stale_handle_free_panics() {
        let (stale, rbb, _live) = stale_and_live();
        rbb.free(stale);
    }

    #[test]
    #[should_panic(expected = "another ring block buffer")]
    fn test_stale_handle_write_panics() {
        let (mut stale, rbb, _live) = stale_and_live();
        rbb.block_bytes_mut(&mut stale).fill(0x55);
    }

    #[test]
    fn test_stale_handle_leaves_live_block_alone() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let (mut stale, rbb, live) = stale_and_live();
        let wrote = catch_unwind(AssertUnwindSafe(|| {
            rbb.block_bytes_mut(&mut stale).fill(0x55);
        }));
        assert!(wrote.is_err());
        let freed = catch_unwind(AssertUnwindSafe(|| rbb.free(stale)));
        assert!(freed.is_err());

        // lock was released on unwind, block untouched
        assert_eq!(rbb.status(&live), BlockStatus::Inited);
        assert!(rbb.block_bytes(&live).iter().all(|&b| b == 0xAA));
        assert_eq!(rbb.stats().live_blocks, 1);
        rbb.free(live);
    }

    #[test]
    #[should_panic(expected = "another ring block buffer")]
    fn test_same_storage_new_ring_rejects_old_handle() {
        let mut buf = [0u8; 16];
        let mut pool = [BlockDescriptor::UNUSED; 2];

        let stale = {
            let first = RingBlockBuffer::<NoIrq>::init(&mut buf, &mut pool);
            first.allocate(4).unwrap()
        };
        let second = RingBlockBuffer::<NoIrq>::init(&mut buf, &mut pool);
        let _live = second.allocate(4).unwrap();
        second.free(stale);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_block_id_out_of_range_panics() {
        let rbb = ring(16, 2);
        let bogus = BlockHandle::new(BlockId::new(7), 0, 1, rbb.tag());
        rbb.free(bogus);
    }
}
