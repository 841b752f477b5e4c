//! No-op masking for targets without signals
//!
//! Critical sections fall back to the spin lock alone.

use rbb_core::IrqControl;

#[derive(Debug, Clone, Copy, Default)]
pub struct SignalMask;

impl IrqControl for SignalMask {
    type Token = ();

    #[inline]
    fn disable() {}

    #[inline]
    fn restore(_token: ()) {}
}
