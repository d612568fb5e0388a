#![forbid(unsafe_code)]

//! Soft-error logging.
//!
//! Decoding never fails hard, so every fallback is logged instead. With the
//! `tracing` feature the macros below are `tracing`'s own; without it they
//! expand to `()` and the crate carries no logging dependency. They are
//! usable anywhere an expression is, including match arms.
//!
//! The default build has the feature off; CI checks both
//! `cargo test -p gzui-core` and `cargo test -p gzui-core --features tracing`.
//!
//! Only the levels the decoders use are provided: `debug!` for attribute
//! fallbacks, `warn!` for skipped input, and `debug_span!` around a parse.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards its arguments.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// Discards its arguments.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// Evaluates to an inert [`Span`](crate::logging::Span).
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::Span
        };
    }
}

/// Stand-in for `tracing::Span` when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct Span;

#[cfg(not(feature = "tracing"))]
impl Span {
    /// Returns a guard that does nothing on drop.
    #[must_use]
    pub fn enter(&self) -> Entered {
        Entered
    }
}

#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct Entered;

/// Install a JSON subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn disabled_macros_compile_away() {
        crate::debug!(attribute = "area", "ignored");
        crate::warn!("ignored {}", 1);
        let span = crate::debug_span!("parse_script", bytes = 3);
        let _guard = span.enter();
    }

    #[test]
    fn disabled_macros_are_expressions() {
        let () = match "x".parse::<u8>() {
            Ok(_) => crate::debug!("parsed"),
            Err(_) => crate::warn!(input = "x", "not a number"),
        };
        let () = if true { crate::debug!(value = 1) } else { crate::warn!("unreachable") };
    }
}
