//! # rbb-core
//!
//! Platform-agnostic ring block buffer: a fixed byte buffer handed out as
//! variable-length, non-overlapping blocks in ring order, for zero-copy
//! producer/consumer hand-off between threads and interrupt handlers.
//!
//! Interrupt masking is abstracted behind [`IrqControl`]; platform
//! implementations live in `rbb-runtime`.
//!
//! ## Modules
//!
//! - `id` - Block identifier (descriptor pool index)
//! - `state` - Block lifecycle status
//! - `descriptor` - Per-block metadata record
//! - `pool` - Fixed descriptor pool with a free stack
//! - `list` - Allocation-ordered, index-linked list of live blocks
//! - `alloc` - Free-space classification and placement
//! - `handle` - Move-only block handles
//! - `queue` - Contiguous block queues
//! - `rbb` - The ring block buffer
//! - `critical` - Interrupt-masking spin-lock critical sections
//! - `spinlock` - Internal spinlock primitive
//! - `traits` - Platform traits
//! - `error` - Error types
//! - `kprint` - Kernel-style logging macros
//! - `env` - Environment variable utilities

pub mod id;
pub mod state;
pub mod descriptor;
pub mod pool;
pub mod list;
pub mod alloc;
pub mod handle;
pub mod queue;
pub mod rbb;
pub mod critical;
pub mod spinlock;
pub mod traits;
pub mod error;
pub mod kprint;
pub mod env;

pub use id::BlockId;
pub use state::BlockStatus;
pub use descriptor::{BlockDescriptor, BlockInfo};
pub use alloc::{Layout, Span};
pub use handle::BlockHandle;
pub use queue::BlockQueue;
pub use rbb::{RbbStats, RingBlockBuffer};
pub use critical::{CriticalCell, CriticalSection};
pub use spinlock::SpinLock;
pub use traits::{IrqControl, NoIrq};
pub use error::{AllocTarget, RbbError, RbbResult};
pub use env::{env_get, env_get_bool, env_get_opt, env_is_set};
