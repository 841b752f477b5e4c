//! Block descriptor pool
//!
//! Fixed-capacity set of descriptor slots. Unused slots are chained through
//! their `next` field into a LIFO free stack, so claiming and releasing a
//! slot is O(1) and never touches the heap. Recently freed slots are reused
//! first.

use core::ops::{Deref, DerefMut};

use crate::descriptor::BlockDescriptor;
use crate::id::BlockId;
use crate::state::BlockStatus;

/// Descriptor storage: caller-supplied or heap-owned
pub(crate) enum Slots<'a> {
    Borrowed(&'a mut [BlockDescriptor]),
    Owned(Box<[BlockDescriptor]>),
}

impl<'a> Deref for Slots<'a> {
    type Target = [BlockDescriptor];

    #[inline]
    fn deref(&self) -> &[BlockDescriptor] {
        match self {
            Slots::Borrowed(s) => s,
            Slots::Owned(s) => s,
        }
    }
}

impl<'a> DerefMut for Slots<'a> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [BlockDescriptor] {
        match self {
            Slots::Borrowed(s) => s,
            Slots::Owned(s) => s,
        }
    }
}

/// Pool of block descriptors
pub struct DescriptorPool<'a> {
    slots: Slots<'a>,

    /// Top of the free stack
    free_head: BlockId,

    /// Number of slots on the free stack
    free_count: usize,
}

impl<'a> DescriptorPool<'a> {
    pub(crate) fn new(slots: Slots<'a>) -> Self {
        assert!(
            slots.len() < BlockId::NONE.as_usize(),
            "descriptor pool too large"
        );

        let mut pool = Self {
            slots,
            free_head: BlockId::NONE,
            free_count: 0,
        };
        pool.reset();
        pool
    }

    /// Mark every slot unused and rebuild the free stack
    ///
    /// Slot 0 ends up on top, so a fresh pool hands out slots in index order.
    pub(crate) fn reset(&mut self) {
        let n = self.slots.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = BlockDescriptor::UNUSED;
            slot.next = if i + 1 < n {
                BlockId::new((i + 1) as u32)
            } else {
                BlockId::NONE
            };
        }
        self.free_head = if n > 0 { BlockId::new(0) } else { BlockId::NONE };
        self.free_count = n;
    }

    /// Pop an unused slot off the free stack
    #[inline]
    pub(crate) fn claim(&mut self) -> Option<BlockId> {
        let id = self.free_head.to_option()?;
        let slot = &mut self.slots[id.as_usize()];
        debug_assert_eq!(slot.status, BlockStatus::Unused);

        self.free_head = slot.next;
        slot.next = BlockId::NONE;
        self.free_count -= 1;
        Some(id)
    }

    /// Reset a slot to unused and push it on the free stack
    #[inline]
    pub(crate) fn release(&mut self, id: BlockId) {
        let slot = &mut self.slots[id.as_usize()];
        slot.clear();
        slot.next = self.free_head;
        self.free_head = id;
        self.free_count += 1;
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> &BlockDescriptor {
        &self.slots[id.as_usize()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: BlockId) -> &mut BlockDescriptor {
        &mut self.slots[id.as_usize()]
    }

    /// Total number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots available to `claim`
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.free_head.is_none()
    }

    /// Check if a slot index is within range
    #[inline]
    pub fn is_valid(&self, id: BlockId) -> bool {
        id.is_some() && id.as_usize() < self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(n: usize) -> DescriptorPool<'static> {
        DescriptorPool::new(Slots::Owned(vec![BlockDescriptor::UNUSED; n].into_boxed_slice()))
    }

    #[test]
    fn test_claim_sequential() {
        let mut pool = owned(4);

        assert_eq!(pool.claim(), Some(BlockId::new(0)));
        assert_eq!(pool.claim(), Some(BlockId::new(1)));
        assert_eq!(pool.claim(), Some(BlockId::new(2)));
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_release_reuse_lifo() {
        let mut pool = owned(4);

        let a = pool.claim().unwrap();
        let b = pool.claim().unwrap();
        pool.get_mut(a).reserve(0, 4);
        pool.get_mut(b).reserve(4, 4);

        pool.release(a);
        assert_eq!(pool.get(a).status(), BlockStatus::Unused);
        assert_eq!(pool.free_count(), 3);

        // Most recently released slot comes back first
        assert_eq!(pool.claim(), Some(a));
    }

    #[test]
    fn test_exhaustion() {
        let mut pool = owned(2);

        assert!(pool.claim().is_some());
        assert!(pool.claim().is_some());
        assert!(pool.is_exhausted());
        assert_eq!(pool.claim(), None);
    }

    #[test]
    fn test_borrowed_storage_reset() {
        let mut storage = [BlockDescriptor::UNUSED; 3];
        storage[1].reserve(10, 2);

        let pool = DescriptorPool::new(Slots::Borrowed(&mut storage));
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.get(BlockId::new(1)).status(), BlockStatus::Unused);
        assert!(pool.is_valid(BlockId::new(2)));
        assert!(!pool.is_valid(BlockId::new(3)));
        assert!(!pool.is_valid(BlockId::NONE));
    }
}
