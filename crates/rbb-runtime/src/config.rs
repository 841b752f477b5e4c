//! Ring block buffer configuration

use rbb_core::env::env_get;
use rbb_core::BlockId;

/// Default backing buffer size (64 KiB)
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Default descriptor pool size
pub const DEFAULT_MAX_BLOCKS: usize = 256;

pub const ENV_CAPACITY: &str = "RBB_CAPACITY";
pub const ENV_MAX_BLOCKS: &str = "RBB_MAX_BLOCKS";

/// Sizes for a heap-backed ring block buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbbConfig {
    /// Backing buffer size in bytes
    pub capacity: usize,

    /// Maximum number of live blocks
    pub max_blocks: usize,
}

impl Default for RbbConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_blocks: DEFAULT_MAX_BLOCKS,
        }
    }
}

impl RbbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `RBB_CAPACITY` / `RBB_MAX_BLOCKS`
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_get(ENV_CAPACITY, defaults.capacity),
            max_blocks: env_get(ENV_MAX_BLOCKS, defaults.max_blocks),
        }
    }

    /// Set the backing buffer size
    pub fn capacity(mut self, bytes: usize) -> Self {
        self.capacity = bytes;
        self
    }

    /// Set the descriptor pool size
    pub fn max_blocks(mut self, n: usize) -> Self {
        self.max_blocks = n;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.capacity == 0 {
            return Err("capacity must be at least 1");
        }
        if self.max_blocks == 0 {
            return Err("max_blocks must be at least 1");
        }
        if self.max_blocks >= BlockId::NONE.as_usize() {
            return Err("max_blocks exceeds the block id range");
        }
        Ok(())
    }
}
