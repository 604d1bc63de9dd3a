//! Error types for the errchain library.
//!
//! The error values built by `errchain` never fail loudly: allocation failure
//! and absent input are reported through shared sentinel values. This crate
//! holds the diagnostics for everything around those values: allocator
//! refusals, sink failures while rendering, and configuration problems.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use errchain_error::{ErrchainResult, ConfigError};
//!
//! fn load() -> ErrchainResult<String> {
//!     Err(ConfigError::new("Missing [render] table"))?
//! }
//!
//! match load() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod alloc;
mod config;
mod render;
mod error;

pub use alloc::{AllocError, AllocErrorKind};
pub use config::ConfigError;
pub use render::{RenderError, RenderErrorKind};
pub use error::{ErrchainError, ErrchainErrorKind, ErrchainResult};
