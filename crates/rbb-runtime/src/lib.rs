//! # rbb-runtime
//!
//! Host platform support for the ring block buffer.
//!
//! This crate provides:
//! - Interrupt masking via the thread signal mask (`irq`)
//! - Environment-driven configuration (`config`)
//! - Heap-backed construction from a config (`ring`)

pub mod config;
pub mod irq;
pub mod ring;

pub use config::RbbConfig;
pub use irq::SignalMask;
pub use ring::{create_ring, HostRing};

/// Interrupt masking for the current platform
pub type HostIrq = SignalMask;
