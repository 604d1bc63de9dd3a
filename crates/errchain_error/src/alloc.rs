//! Allocator refusal types.

/// Reasons an allocator can refuse a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AllocErrorKind {
    /// The allocator declined the request outright
    #[display("Allocation of {} bytes refused", _0)]
    Refused(usize),
    /// Granting the request would exceed the configured byte limit
    #[display("Allocation of {} bytes exceeds limit ({} of {} bytes in use)", requested, in_use, limit)]
    LimitExceeded {
        /// Bytes requested
        requested: usize,
        /// Bytes currently held
        in_use: usize,
        /// Configured limit
        limit: usize,
    },
    /// The platform allocator could not provide the memory
    #[display("Out of memory reserving {} bytes", _0)]
    Exhausted(usize),
}

/// Allocation error with location tracking.
///
/// # Examples
///
/// ```
/// use errchain_error::{AllocError, AllocErrorKind};
///
/// let err = AllocError::new(AllocErrorKind::Refused(1024));
/// assert_eq!(err.kind(), &AllocErrorKind::Refused(1024));
/// assert!(format!("{}", err).contains("1024 bytes refused"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Allocation Error: {} at line {} in {}", kind, line, file)]
pub struct AllocError {
    kind: AllocErrorKind,
    line: u32,
    file: &'static str,
}

impl AllocError {
    /// Create a new allocation error with caller location tracking.
    #[track_caller]
    pub fn new(kind: AllocErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AllocErrorKind {
        &self.kind
    }
}
