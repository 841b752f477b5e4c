//! Block slot identifier type

use core::fmt;

/// Index of a descriptor slot in the block pool
///
/// Links in the block list and in the pool's free chain are `BlockId`s,
/// never pointers. The maximum value (u32::MAX) is reserved as the
/// end-of-chain sentinel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Sentinel value terminating a chain
    pub const NONE: BlockId = BlockId(u32::MAX);

    /// Create a new BlockId from a raw value
    #[inline]
    pub const fn new(id: u32) -> Self {
        BlockId(id)
    }

    /// Get the raw u32 value
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Get as usize for indexing
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Check if this is the NONE sentinel
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    /// Convert to Option
    #[inline]
    pub const fn to_option(self) -> Option<BlockId> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<u32> for BlockId {
    #[inline]
    fn from(id: u32) -> Self {
        BlockId(id)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "BlockId(NONE)")
        } else {
            write!(f, "BlockId({})", self.0)
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Default for BlockId {
    fn default() -> Self {
        BlockId::NONE
    }
}
