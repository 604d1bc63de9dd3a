//! Rendering error types.

/// Ways a render can be cut short.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RenderErrorKind {
    /// The sink reported a negative status
    #[display("Sink rejected segment with status {}", _0)]
    Rejected(i32),
    /// Writing to the output stream failed
    #[display("Failed to write segment: {}", _0)]
    Io(String),
    /// The formatter refused a segment
    #[display("Formatter rejected segment")]
    Format,
}

/// Render error with location tracking.
///
/// Every render error maps to a negative status through [`RenderError::status`],
/// so callers that speak in status codes can keep doing so.
///
/// # Examples
///
/// ```
/// use errchain_error::{RenderError, RenderErrorKind};
///
/// let err = RenderError::new(RenderErrorKind::Rejected(-7));
/// assert_eq!(err.status(), -7);
/// assert!(format!("{}", err).contains("status -7"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The specific error condition
    pub kind: RenderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RenderError {
    /// Create a new RenderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Status code equivalent of this error. Always negative.
    pub fn status(&self) -> i32 {
        match self.kind {
            RenderErrorKind::Rejected(status) if status < 0 => status,
            _ => -1,
        }
    }
}

impl From<std::io::Error> for RenderError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(RenderErrorKind::Io(err.to_string()))
    }
}

impl From<std::fmt::Error> for RenderError {
    #[track_caller]
    fn from(_: std::fmt::Error) -> Self {
        Self::new(RenderErrorKind::Format)
    }
}
