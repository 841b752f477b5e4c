//! Interrupt masking for hosted targets
//!
//! On a hosted OS the asynchronous "interrupts" that can re-enter a ring
//! block buffer are signal handlers. Masking every signal on the calling
//! thread for the length of a critical section gives a handler the same
//! guarantee a bare-metal ISR gets from disabling interrupts.

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::*;
    } else {
        mod fallback;
        pub use fallback::*;
    }
}
