//! Live block list
//!
//! Singly linked, allocation-ordered list of live descriptors, threaded
//! through the descriptors' `next` indices. Head is the oldest allocation,
//! tail the newest. Appends are O(1); unlinking walks from the head, which
//! is bounded by the pool size.

use crate::descriptor::BlockDescriptor;
use crate::id::BlockId;
use crate::pool::DescriptorPool;

/// Head/tail/length of the live block chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockList {
    head: BlockId,
    tail: BlockId,
    len: usize,
}

impl BlockList {
    pub const fn new() -> Self {
        Self {
            head: BlockId::NONE,
            tail: BlockId::NONE,
            len: 0,
        }
    }

    /// Oldest live block
    #[inline]
    pub fn head(&self) -> Option<BlockId> {
        self.head.to_option()
    }

    /// Newest live block
    #[inline]
    pub fn tail(&self) -> Option<BlockId> {
        self.tail.to_option()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a freshly reserved block
    pub(crate) fn push_back(&mut self, pool: &mut DescriptorPool<'_>, id: BlockId) {
        pool.get_mut(id).next = BlockId::NONE;
        match self.tail.to_option() {
            Some(tail) => pool.get_mut(tail).next = id,
            None => self.head = id,
        }
        self.tail = id;
        self.len += 1;
    }

    /// Find the predecessor of `id`
    ///
    /// Returns `None` if `id` is not linked, `Some(BlockId::NONE)` if it is
    /// the head.
    fn find_prev(&self, pool: &DescriptorPool<'_>, id: BlockId) -> Option<BlockId> {
        let mut prev = BlockId::NONE;
        let mut cur = self.head;
        while cur.is_some() {
            if cur == id {
                return Some(prev);
            }
            prev = cur;
            cur = pool.get(cur).next;
        }
        None
    }

    /// Remove `id` from the list
    ///
    /// Returns `false` if it was not linked.
    pub(crate) fn unlink(&mut self, pool: &mut DescriptorPool<'_>, id: BlockId) -> bool {
        let prev = match self.find_prev(pool, id) {
            Some(prev) => prev,
            None => return false,
        };

        let next = pool.get(id).next;
        match prev.to_option() {
            Some(prev) => pool.get_mut(prev).next = next,
            None => self.head = next,
        }
        if self.tail == id {
            self.tail = prev;
        }
        pool.get_mut(id).next = BlockId::NONE;
        self.len -= 1;
        true
    }

    /// Remove `count` consecutive entries starting at `first`
    ///
    /// `release` is called for each removed entry, oldest first, after it
    /// has been detached from the chain. Returns the number removed, which
    /// is less than `count` only if the run was not fully linked.
    pub(crate) fn unlink_run<'a, F>(
        &mut self,
        pool: &mut DescriptorPool<'a>,
        first: BlockId,
        count: usize,
        mut release: F,
    ) -> usize
    where
        F: FnMut(&mut DescriptorPool<'a>, BlockId),
    {
        if count == 0 {
            return 0;
        }
        let prev = match self.find_prev(pool, first) {
            Some(prev) => prev,
            None => return 0,
        };

        let mut removed = 0;
        let mut cur = first;
        while removed < count && cur.is_some() {
            let next = pool.get(cur).next;
            pool.get_mut(cur).next = BlockId::NONE;
            release(pool, cur);
            removed += 1;
            cur = next;
        }

        match prev.to_option() {
            Some(prev) => pool.get_mut(prev).next = cur,
            None => self.head = cur,
        }
        if cur.is_none() {
            self.tail = prev;
        }
        self.len -= removed;
        removed
    }

    /// Iterate live blocks, oldest first
    pub fn iter<'p, 'a>(&self, pool: &'p DescriptorPool<'a>) -> Iter<'p, 'a> {
        Iter {
            pool,
            cur: self.head,
        }
    }
}

impl Default for BlockList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(BlockId, &BlockDescriptor)` in allocation order
pub struct Iter<'p, 'a> {
    pool: &'p DescriptorPool<'a>,
    cur: BlockId,
}

impl<'p, 'a> Iterator for Iter<'p, 'a> {
    type Item = (BlockId, &'p BlockDescriptor);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur.to_option()?;
        let desc = self.pool.get(id);
        self.cur = desc.next;
        Some((id, desc))
    }
}
