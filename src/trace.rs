//! Feature-gated tracing facade.
//!
//! With the `tracing` feature the solver, machine and reader log through the
//! `tracing` crate. Without it these macros expand to nothing and spans are a
//! unit struct, so instrumented code costs nothing.
//!
//! ```rust,ignore
//! #[cfg(feature = "tracing")]
//! use crate::trace::{debug_span, trace};
//!
//! #[cfg(feature = "tracing")]
//! let _span = debug_span!("next_solution", solutions = 3).entered();
//! #[cfg(feature = "tracing")]
//! trace!(depth = 2, "retry_branch");
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, trace_span, warn, Level, Span};

#[cfg(not(feature = "tracing"))]
mod noop {
    /// Span stand-in.
    pub struct Span;

    impl Span {
        pub fn none() -> Self {
            Span
        }

        pub fn entered(self) -> SpanGuard {
            SpanGuard
        }
    }

    pub struct SpanGuard;

    #[derive(Clone, Copy, Debug)]
    pub struct Level;

    impl Level {
        pub const TRACE: Level = Level;
        pub const DEBUG: Level = Level;
        pub const INFO: Level = Level;
        pub const WARN: Level = Level;
    }

    #[macro_export]
    macro_rules! trace {
        ($($tt:tt)*) => {};
    }

    #[macro_export]
    macro_rules! debug {
        ($($tt:tt)*) => {};
    }

    #[macro_export]
    macro_rules! info {
        ($($tt:tt)*) => {};
    }

    #[macro_export]
    macro_rules! warn {
        ($($tt:tt)*) => {};
    }

    #[macro_export]
    macro_rules! debug_span {
        ($($tt:tt)*) => {
            $crate::trace::Span::none()
        };
    }

    #[macro_export]
    macro_rules! trace_span {
        ($($tt:tt)*) => {
            $crate::trace::Span::none()
        };
    }

    pub use crate::{debug, debug_span, info, trace, trace_span, warn};
}

#[cfg(not(feature = "tracing"))]
pub use noop::*;

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls do nothing.
#[cfg(feature = "tracing")]
pub fn init_subscriber() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false),
        )
        .with(filter)
        .try_init()
        .ok();
}

#[cfg(not(feature = "tracing"))]
pub fn init_subscriber() {}

/// Record folded stacks to `path` for flamegraph tools.
///
/// The returned guard flushes the file when dropped.
#[cfg(feature = "tracing")]
pub fn init_flamegraph(path: &str) -> Result<impl Drop, String> {
    use tracing_flame::FlameLayer;
    use tracing_subscriber::{prelude::*, registry::Registry};

    let (flame_layer, guard) = FlameLayer::with_file(path)
        .map_err(|e| format!("cannot open flamegraph output '{}': {}", path, e))?;
    Registry::default()
        .with(flame_layer)
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(guard)
}

#[cfg(not(feature = "tracing"))]
pub fn init_flamegraph(_path: &str) -> Result<impl Drop, String> {
    struct NoFlame;
    impl Drop for NoFlame {
        fn drop(&mut self) {}
    }
    Ok(NoFlame)
}

#[cfg(test)]
#[path = "tests/trace.rs"]
mod tests;
