//! Causally chained error values.
//!
//! An error is a chain of messages, newest context outermost:
//!
//! ```text
//! loading profile: reading /etc/app.toml: permission denied
//! ```
//!
//! Chains are built bottom-up. The innermost cause is constructed first, and
//! each caller that propagates it wraps it in its own context. Rendering walks
//! the chain and streams each piece through a [`Sink`] without assembling the
//! full text in memory.
//!
//! # Never failing
//!
//! Constructors and wraps always return a usable [`ErrorValue`]:
//! - allocation failure yields the shared [`OUT_OF_MEMORY`] sentinel
//! - an absent message yields the shared [`EMPTY`] sentinel
//!
//! Sentinels are process-wide statics. Destroying one does nothing, and any
//! number of chains may point at them.
//!
//! # Allocation
//!
//! Every node and owned message buffer is requested from an [`Allocator`].
//! [`Factory`] threads an allocator through construction; the associated
//! functions on [`ErrorValue`] use the [`SystemAllocator`].
//!
//! # Examples
//!
//! ```
//! use errchain::{ErrorValue, wrap_fmt};
//!
//! fn read_profile(path: &str) -> Result<(), ErrorValue<'static>> {
//!     let denied = ErrorValue::new_borrowed("permission denied");
//!     Err(wrap_fmt!(Some(denied), "reading {}", path))
//! }
//!
//! let err = read_profile("/etc/app.toml").unwrap_err();
//! let err = wrap_fmt!(Some(err), "loading profile {}", 3);
//! assert_eq!(
//!     err.to_string(),
//!     "loading profile 3: reading /etc/app.toml: permission denied"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod alloc;
mod config;
mod construct;
mod render;
mod value;
mod wrap;

pub use alloc::{AllocStats, Allocation, Allocator, SystemAllocator, TrackingAllocator, system};
pub use config::{AllocatorConfig, ConfiguredAllocator, ErrchainConfig, RenderConfig};
pub use construct::Factory;
pub use render::{SEPARATOR, Sink, StatusSink, WriterSink, render, render_to_writer};
pub use value::{Chain, EMPTY, ErrorValue, MAX_MESSAGE_LEN, Node, OUT_OF_MEMORY, Ownership};

pub use errchain_error::{
    AllocError, AllocErrorKind, ConfigError, ErrchainError, ErrchainErrorKind, ErrchainResult,
    RenderError, RenderErrorKind,
};

/// Build an [`ErrorValue`] from a format template, using the system allocator.
///
/// The rendered message is truncated to `MAX_MESSAGE_LEN - 1` bytes.
///
/// ```
/// let err = errchain::error_fmt!("port {} in use", 8080);
/// assert_eq!(err.message(), "port 8080 in use");
/// ```
#[macro_export]
macro_rules! error_fmt {
    ($($arg:tt)+) => {
        $crate::ErrorValue::new_formatted(::std::format_args!($($arg)+))
    };
}

/// Wrap an optional cause in an [`ErrorValue`] built from a format template,
/// using the system allocator.
///
/// ```
/// let err = errchain::wrap_fmt!(None, "retry {} of {}", 3, 5);
/// assert_eq!(err.to_string(), "retry 3 of 5: <Empty>");
/// ```
#[macro_export]
macro_rules! wrap_fmt {
    ($cause:expr, $($arg:tt)+) => {
        $crate::ErrorValue::wrap_formatted($cause, ::std::format_args!($($arg)+))
    };
}
