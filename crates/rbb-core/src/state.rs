//! Block lifecycle status

use core::fmt;

/// Lifecycle status of a block descriptor
///
/// `Unused -> Inited -> Put -> Get -> Unused`. There is no terminal state;
/// slots are recycled forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BlockStatus {
    /// Owned by the pool, offset/len meaningless
    #[default]
    Unused = 0,

    /// Reserved by `allocate`, producer is filling it
    Inited = 1,

    /// Contents ready for a consumer
    Put = 2,

    /// Claimed by a consumer, awaiting `free`
    Get = 3,
}

impl BlockStatus {
    /// Check if the descriptor represents reserved space in the ring
    #[inline]
    pub const fn is_live(&self) -> bool {
        !matches!(self, BlockStatus::Unused)
    }

    /// Check if a consumer may claim this block
    #[inline]
    pub const fn is_ready(&self) -> bool {
        matches!(self, BlockStatus::Put)
    }
}

impl From<u8> for BlockStatus {
    fn from(v: u8) -> Self {
        match v {
            1 => BlockStatus::Inited,
            2 => BlockStatus::Put,
            3 => BlockStatus::Get,
            _ => BlockStatus::Unused,
        }
    }
}

impl From<BlockStatus> for u8 {
    fn from(status: BlockStatus) -> u8 {
        status as u8
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Unused => write!(f, "UNUSED"),
            BlockStatus::Inited => write!(f, "INITED"),
            BlockStatus::Put => write!(f, "PUT"),
            BlockStatus::Get => write!(f, "GET"),
        }
    }
}
