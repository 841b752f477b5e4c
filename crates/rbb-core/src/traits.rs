//! Platform traits
//!
//! Interface between the platform-agnostic ring block buffer and the
//! platform runtime that knows how to mask interrupts.

/// Platform interrupt masking
///
/// `disable` masks every interrupt source that may call into a ring block
/// buffer on the current CPU (or thread) and returns whatever is needed to
/// put the previous mask back. `restore` reinstates it. Calls pair up
/// strictly LIFO and are never nested by this crate.
///
/// Implementations must be callable from interrupt context.
pub trait IrqControl {
    /// Saved mask state
    type Token;

    /// Mask interrupts, returning the previous state
    fn disable() -> Self::Token;

    /// Restore the state saved by the matching `disable`
    fn restore(token: Self::Token);
}

/// No interrupt masking
///
/// Mutual exclusion comes from the spin lock alone. Suitable when no
/// asynchronous handler ever touches the buffer (tests, plain threads).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIrq;

impl IrqControl for NoIrq {
    type Token = ();

    #[inline]
    fn disable() -> Self::Token {}

    #[inline]
    fn restore(_token: Self::Token) {}
}
