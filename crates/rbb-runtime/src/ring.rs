//! Host ring block buffers
//!
//! A [`HostRing`] masks signals around every critical section, so it can be
//! shared between threads and signal handlers.

use rbb_core::{kdebug, kwarn, RbbError, RbbResult, RingBlockBuffer};

use crate::config::RbbConfig;
use crate::HostIrq;

/// Ring block buffer using the host's interrupt masking
pub type HostRing<'a> = RingBlockBuffer<'a, HostIrq>;

/// Validate `config` and build a heap-backed ring
pub fn create_ring(config: &RbbConfig) -> RbbResult<HostRing<'static>> {
    if let Err(reason) = config.validate() {
        kwarn!("rbb: rejected config {:?}: {}", config, reason);
        return Err(RbbError::InvalidConfig(reason));
    }

    let ring = HostRing::create(config.capacity, config.max_blocks).map_err(|e| {
        kwarn!("rbb: create failed: {}", e);
        e
    })?;
    kdebug!(
        "rbb: host ring ready, {} bytes / {} blocks",
        ring.capacity(),
        ring.max_blocks()
    );
    Ok(ring)
}
