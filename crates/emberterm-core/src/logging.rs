//! Logging support.
//!
//! With the `tracing` feature enabled this re-exports the `tracing` macros
//! the engine uses; without it, no-op macros keep call sites unchanged and
//! the default build free of logging dependencies.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {
            ()
        };
    }

    macro_rules! trace {
        ($($arg:tt)*) => {
            ()
        };
    }

    pub(crate) use {debug, trace};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::{debug, trace};
