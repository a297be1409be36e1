#![forbid(unsafe_code)]

//! Logging macros for crates built on the core.
//!
//! Widget code logs through `gridboard_core::debug!`, `trace!` and `warn!`.
//! With the `tracing` feature they are the `tracing` macros; without it they
//! expand to nothing, so a widget crate compiled without logging pays
//! nothing for its call sites.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Dropped like the others; fetch failures still reach the screen.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
