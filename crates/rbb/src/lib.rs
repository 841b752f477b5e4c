//! # rbb - Ring Block Buffer
//!
//! Zero-copy hand-off of variable-length byte blocks between producers and
//! consumers that may run in interrupt (signal) context.
//!
//! ## Features
//!
//! - **Zero-copy**: blocks are windows into one fixed backing buffer
//! - **Ring placement**: O(1) allocation from the free space after the newest
//!   block, wrapping to the start only when forced
//! - **Block queues**: drain a run of adjacent ready blocks as one flat span
//! - **Interrupt safe**: every operation is a short, non-blocking critical
//!   section with signals masked
//! - **No allocation after setup**: `init` works on caller-owned storage
//!
//! ## Quick Start
//!
//! ```
//! use rbb::{create_ring, RbbConfig};
//!
//! let ring = create_ring(&RbbConfig::new().capacity(1024).max_blocks(16)).unwrap();
//!
//! // producer
//! assert!(ring.write_block(b"log line 1\n"));
//! assert!(ring.write_block(b"log line 2\n"));
//!
//! // consumer: one contiguous span for both lines
//! let queue = ring.queue_get(usize::MAX);
//! assert_eq!(ring.queue_bytes(&queue), b"log line 1\nlog line 2\n");
//! ring.queue_free(queue);
//! ```
//!
//! ## Block lifecycle
//!
//! ```text
//!   allocate        put            get / queue_get       free / queue_free
//! UNUSED ──▶ INITED ──▶ PUT ──────────────▶ GET ──────────────────▶ UNUSED
//!              │                                                    ▲
//!              └────────────────────── free ────────────────────────┘
//! ```

// Re-export core types
pub use rbb_core::{
    AllocTarget,
    BlockDescriptor,
    BlockHandle,
    BlockId,
    BlockInfo,
    BlockQueue,
    BlockStatus,
    IrqControl,
    NoIrq,
    RbbError,
    RbbResult,
    RbbStats,
};

// Re-export kprint macros for debug logging
pub use rbb_core::{kprint, kprintln, kerror, kwarn, kinfo, kdebug, ktrace};
pub use rbb_core::kprint::{LogLevel, init as init_logging, set_log_level, set_flush_enabled};

// Re-export env utilities
pub use rbb_core::{env_get, env_get_bool, env_get_opt, env_is_set};

// Re-export runtime types
pub use rbb_runtime::{create_ring, HostIrq, HostRing, RbbConfig, SignalMask};

/// Ring block buffer with host interrupt masking
///
/// Use [`rbb_core::RingBlockBuffer`] directly to pick another [`IrqControl`].
pub type RingBlockBuffer<'a> = rbb_core::RingBlockBuffer<'a, HostIrq>;
