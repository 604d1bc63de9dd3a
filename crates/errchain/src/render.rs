//! Streaming an error chain through a sink.
//!
//! Rendering never builds the full text in memory. Each piece (header, each
//! message, each separator, trailer) is handed to a [`Sink`] in order, and the
//! first failure stops the render.
//!
//! ```text
//! <header><outer message>: <next message>: ... <innermost message><trailer>
//! ```

use crate::value::{EMPTY, Node};
use errchain_error::{RenderError, RenderErrorKind};
use std::fmt;
use std::io;
use tracing::instrument;

/// Text placed between two links of a chain.
pub const SEPARATOR: &str = ": ";

/// Consumer of rendered segments.
///
/// A successful `emit` returns a non-negative status, which [`render`] hands
/// back to its caller when that segment was the last one.
pub trait Sink {
    /// Consume one segment.
    ///
    /// # Errors
    ///
    /// Any error aborts the render; no further segments are emitted.
    fn emit(&mut self, segment: &str) -> Result<usize, RenderError>;
}

impl<F> Sink for F
where
    F: FnMut(&str) -> Result<usize, RenderError>,
{
    fn emit(&mut self, segment: &str) -> Result<usize, RenderError> {
        self(segment)
    }
}

/// Adapts a consumer that reports an integer status, negative on failure.
///
/// # Example
///
/// ```
/// use errchain::{ErrorValue, StatusSink, render};
///
/// let err = ErrorValue::new("timeout");
/// let mut calls = 0;
/// let mut sink = StatusSink::new(|_: &str| {
///     calls += 1;
///     if calls == 2 { -5 } else { 0 }
/// });
/// let result = render(Some("error: "), Some(err.node()), None, &mut sink);
/// assert_eq!(result.map_err(|e| e.status()), Err(-5));
/// ```
#[derive(Debug)]
pub struct StatusSink<F> {
    consumer: F,
}

impl<F> StatusSink<F>
where
    F: FnMut(&str) -> i32,
{
    /// Wrap `consumer`.
    pub fn new(consumer: F) -> Self {
        Self { consumer }
    }
}

impl<F> Sink for StatusSink<F>
where
    F: FnMut(&str) -> i32,
{
    fn emit(&mut self, segment: &str) -> Result<usize, RenderError> {
        let status = (self.consumer)(segment);
        usize::try_from(status).map_err(|_| RenderError::new(RenderErrorKind::Rejected(status)))
    }
}

/// Writes every segment to an output stream.
///
/// A successful write reports the segment's length in bytes.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: io::Write> WriterSink<W> {
    /// Wrap `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Sink for WriterSink<W> {
    fn emit(&mut self, segment: &str) -> Result<usize, RenderError> {
        self.writer.write_all(segment.as_bytes())?;
        Ok(segment.len())
    }
}

pub(crate) struct FmtSink<'a, 'b> {
    formatter: &'a mut fmt::Formatter<'b>,
}

impl<'a, 'b> FmtSink<'a, 'b> {
    pub(crate) fn new(formatter: &'a mut fmt::Formatter<'b>) -> Self {
        Self { formatter }
    }
}

impl Sink for FmtSink<'_, '_> {
    fn emit(&mut self, segment: &str) -> Result<usize, RenderError> {
        self.formatter.write_str(segment)?;
        Ok(segment.len())
    }
}

/// Render `error` through `sink`, surrounded by optional `header` and `trailer`.
///
/// A `None` error renders as the [`EMPTY`](crate::EMPTY) sentinel. Returns the
/// status of the last segment emitted.
///
/// # Errors
///
/// Returns the first error produced by `sink`, after which nothing more is
/// emitted.
///
/// # Example
///
/// ```
/// use errchain::{ErrorValue, RenderError, render};
///
/// let err = ErrorValue::wrap(None, "outer");
/// let mut out = String::new();
/// let mut sink = |s: &str| -> Result<usize, RenderError> {
///     out.push_str(s);
///     Ok(s.len())
/// };
/// render(None, Some(err.node()), Some("\n"), &mut sink).unwrap();
/// assert_eq!(out, "outer: <Empty>\n");
/// ```
#[instrument(level = "trace", skip_all)]
pub fn render<S>(
    header: Option<&str>,
    error: Option<&Node<'_>>,
    trailer: Option<&str>,
    sink: &mut S,
) -> Result<usize, RenderError>
where
    S: Sink + ?Sized,
{
    let error = error.unwrap_or(&EMPTY);
    let mut status = 0;

    if let Some(header) = header {
        status = sink.emit(header)?;
    }
    for (level, node) in error.chain().enumerate() {
        if level > 0 {
            status = sink.emit(SEPARATOR)?;
        }
        status = sink.emit(node.message())?;
    }
    if let Some(trailer) = trailer {
        status = sink.emit(trailer)?;
    }

    Ok(status)
}

/// Render `error` to an output stream.
///
/// # Errors
///
/// Returns a [`RenderError`] carrying the I/O failure of the first write that
/// failed.
///
/// # Example
///
/// ```
/// use errchain::{ErrorValue, render_to_writer};
///
/// let err = ErrorValue::new_borrowed("Test!");
/// let mut out = Vec::new();
/// render_to_writer(None, Some(err.node()), Some("\n"), &mut out).unwrap();
/// assert_eq!(out, b"Test!\n");
/// ```
pub fn render_to_writer<W: io::Write>(
    header: Option<&str>,
    error: Option<&Node<'_>>,
    trailer: Option<&str>,
    writer: W,
) -> Result<usize, RenderError> {
    render(header, error, trailer, &mut WriterSink::new(writer))
}
