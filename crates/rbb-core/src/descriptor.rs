//! Block descriptor layout
//!
//! One descriptor per pool slot. Callers that bring their own storage
//! declare the pool as an array of [`BlockDescriptor::UNUSED`]:
//!
//! ```
//! use rbb_core::BlockDescriptor;
//!
//! static mut POOL: [BlockDescriptor; 8] = [BlockDescriptor::UNUSED; 8];
//! ```

use crate::id::BlockId;
use crate::state::BlockStatus;

/// Metadata for one span of the backing buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Start of the span within the backing buffer
    pub(crate) offset: usize,

    /// Span length in bytes
    pub(crate) len: usize,

    pub(crate) status: BlockStatus,

    /// Block list successor while live, free chain successor while unused
    pub(crate) next: BlockId,

    /// Drained into an outstanding block queue
    pub(crate) queued: bool,
}

impl BlockDescriptor {
    /// A pool slot that has never been handed out
    pub const UNUSED: BlockDescriptor = BlockDescriptor {
        offset: 0,
        len: 0,
        status: BlockStatus::Unused,
        next: BlockId::NONE,
        queued: false,
    };

    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte of the span
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub const fn status(&self) -> BlockStatus {
        self.status
    }

    #[inline]
    pub const fn is_queued(&self) -> bool {
        self.queued
    }

    /// Turn a freshly claimed slot into a live `Inited` block
    #[inline]
    pub(crate) fn reserve(&mut self, offset: usize, len: usize) {
        self.offset = offset;
        self.len = len;
        self.status = BlockStatus::Inited;
        self.next = BlockId::NONE;
        self.queued = false;
    }

    /// Return the slot to the unused state (bytes are left untouched)
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.status = BlockStatus::Unused;
        self.queued = false;
    }
}

impl Default for BlockDescriptor {
    fn default() -> Self {
        BlockDescriptor::UNUSED
    }
}

/// Snapshot of a live block, reported by diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockInfo {
    pub id: BlockId,
    pub offset: usize,
    pub len: usize,
    pub status: BlockStatus,
    pub queued: bool,
}

impl BlockInfo {
    pub(crate) fn from_descriptor(id: BlockId, desc: &BlockDescriptor) -> Self {
        Self {
            id,
            offset: desc.offset,
            len: desc.len,
            status: desc.status,
            queued: desc.queued,
        }
    }

    /// One past the last byte of the span
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}
