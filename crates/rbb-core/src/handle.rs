//! Block handles
//!
//! A `BlockHandle` is the caller's claim on one live block. Handles are
//! move-only: `put` and `free` consume them, so at most one handle exists
//! for any live window of the backing buffer and a block cannot be freed
//! twice through the safe API.

use crate::id::BlockId;

/// Claim on one live block of a ring block buffer
///
/// Carries the block's span, so `offset`/`len` need no critical section.
#[must_use = "a block that is never put or freed keeps its slot and bytes reserved"]
#[derive(Debug, PartialEq, Eq)]
pub struct BlockHandle {
    id: BlockId,
    offset: usize,
    len: usize,

    /// Tag of the ring block buffer that issued this handle
    owner: usize,
}

impl BlockHandle {
    #[inline]
    pub(crate) const fn new(id: BlockId, offset: usize, len: usize, owner: usize) -> Self {
        Self { id, offset, len, owner }
    }

    /// Pool slot backing this block
    #[inline]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Start of the block within the backing buffer
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Block size in bytes
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte of the block
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub(crate) const fn owner(&self) -> usize {
        self.owner
    }
}
