//! Signal-mask critical sections (Unix)

use nix::sys::signal::{pthread_sigmask, SigSet, SigmaskHow};
use rbb_core::IrqControl;

/// Masks all signals on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalMask;

/// Thread signal mask saved by [`SignalMask::disable`]
#[derive(Debug)]
pub struct SignalToken(SigSet);

impl IrqControl for SignalMask {
    type Token = SignalToken;

    #[inline]
    fn disable() -> SignalToken {
        let mut old = SigSet::empty();
        // Only fails for an invalid `how`
        let _ = pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::all()), Some(&mut old));
        SignalToken(old)
    }

    #[inline]
    fn restore(token: SignalToken) {
        let _ = pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&token.0), None);
    }
}
