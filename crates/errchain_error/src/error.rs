//! Top-level error wrapper types.

use crate::{AllocError, ConfigError, RenderError};

/// Every diagnostic the errchain crates can report.
///
/// # Examples
///
/// ```
/// use errchain_error::{ErrchainError, ConfigError};
///
/// let config_err = ConfigError::new("Bad limit");
/// let err: ErrchainError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ErrchainErrorKind {
    /// Allocator refusal
    #[from(AllocError)]
    Alloc(AllocError),
    /// Sink or stream failure while rendering
    #[from(RenderError)]
    Render(RenderError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Errchain error with kind discrimination.
///
/// # Examples
///
/// ```
/// use errchain_error::{ErrchainError, ErrchainErrorKind, RenderError, RenderErrorKind};
///
/// let err = ErrchainError::from(RenderError::new(RenderErrorKind::Format));
/// assert!(matches!(err.kind(), ErrchainErrorKind::Render(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Errchain Error: {}", _0)]
pub struct ErrchainError(Box<ErrchainErrorKind>);

impl ErrchainError {
    /// Create a new error from a kind.
    pub fn new(kind: ErrchainErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ErrchainErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ErrchainErrorKind
impl<T> From<T> for ErrchainError
where
    T: Into<ErrchainErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for errchain operations.
pub type ErrchainResult<T> = std::result::Result<T, ErrchainError>;
