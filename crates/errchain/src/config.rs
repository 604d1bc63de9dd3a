//! Configuration for rendering and allocation.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from errchain.toml)
//! - User overrides (./errchain.toml or ~/.config/errchain/errchain.toml)
//! - Automatic merging with user values taking precedence

use crate::alloc::{AllocStats, Allocation, Allocator, SystemAllocator, TrackingAllocator};
use crate::render::{self, Sink};
use crate::value::Node;
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use errchain_error::{AllocError, ConfigError, ErrchainError, ErrchainResult, RenderError};
use serde::{Deserialize, Serialize};
use std::io;
use tracing::{debug, instrument};

/// Text surrounding every rendered chain.
///
/// ```toml
/// [render]
/// header = "error: "
/// trailer = "\n"
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct RenderConfig {
    /// Emitted before the outermost message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header: Option<String>,

    /// Emitted after the innermost message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trailer: Option<String>,
}

impl RenderConfig {
    /// Render `error` through `sink` with the configured header and trailer.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `sink`.
    pub fn render<S>(&self, error: Option<&Node<'_>>, sink: &mut S) -> Result<usize, RenderError>
    where
        S: Sink + ?Sized,
    {
        render::render(self.header.as_deref(), error, self.trailer.as_deref(), sink)
    }

    /// Render `error` to `writer` with the configured header and trailer.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub fn render_to_writer<W: io::Write>(
        &self,
        error: Option<&Node<'_>>,
        writer: W,
    ) -> Result<usize, RenderError> {
        render::render_to_writer(self.header.as_deref(), error, self.trailer.as_deref(), writer)
    }
}

/// Which allocator error values are drawn from.
///
/// ```toml
/// [allocator]
/// tracking = true
/// limit_bytes = 65536
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct AllocatorConfig {
    /// Count allocations instead of using the bare system allocator
    #[serde(default)]
    tracking: bool,

    /// Refuse allocations past this many bytes; implies tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit_bytes: Option<usize>,
}

impl AllocatorConfig {
    /// Build the allocator this configuration describes.
    pub fn build(&self) -> ConfiguredAllocator {
        match (self.tracking, self.limit_bytes) {
            (_, Some(limit)) => ConfiguredAllocator::Tracking(TrackingAllocator::with_limit(limit)),
            (true, None) => ConfiguredAllocator::Tracking(TrackingAllocator::new()),
            (false, None) => ConfiguredAllocator::System(SystemAllocator),
        }
    }
}

/// Allocator chosen by an [`AllocatorConfig`].
#[derive(Debug)]
pub enum ConfiguredAllocator {
    /// Plain system allocator
    System(SystemAllocator),
    /// Counting allocator, possibly limited
    Tracking(TrackingAllocator),
}

impl ConfiguredAllocator {
    /// Allocation counters, when tracking.
    pub fn stats(&self) -> Option<AllocStats> {
        match self {
            ConfiguredAllocator::System(_) => None,
            ConfiguredAllocator::Tracking(tracking) => Some(tracking.stats()),
        }
    }
}

impl Allocator for ConfiguredAllocator {
    fn allocate(&self, request: Allocation) -> Result<(), AllocError> {
        match self {
            ConfiguredAllocator::System(system) => system.allocate(request),
            ConfiguredAllocator::Tracking(tracking) => tracking.allocate(request),
        }
    }

    fn release(&self, request: Allocation) {
        match self {
            ConfiguredAllocator::System(system) => system.release(request),
            ConfiguredAllocator::Tracking(tracking) => tracking.release(request),
        }
    }
}

/// Top-level errchain configuration.
///
/// Loads from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from errchain.toml)
/// 2. User override (./errchain.toml or ~/.config/errchain/errchain.toml)
///
/// # Example
///
/// ```no_run
/// use errchain::{ErrchainConfig, ErrorValue};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ErrchainConfig::load()?;
/// let err = ErrorValue::new("disk full");
/// config.render().render_to_writer(Some(err.node()), std::io::stderr())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, Getters)]
pub struct ErrchainConfig {
    /// Header and trailer used when rendering
    #[serde(default)]
    render: RenderConfig,

    /// Allocator selection
    #[serde(default)]
    allocator: AllocatorConfig,
}

impl ErrchainConfig {
    /// Assemble a configuration from its parts.
    pub fn new(render: RenderConfig, allocator: AllocatorConfig) -> Self {
        Self { render, allocator }
    }

    /// Read one errchain TOML file, ignoring the layered defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be opened or holds
    /// settings of the wrong type.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ErrchainResult<Self> {
        debug!("Reading errchain settings file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ErrchainError::from(ConfigError::new(format!(
                    "Cannot open errchain settings {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ErrchainError::from(ConfigError::new(format!(
                    "Invalid errchain settings in {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })
    }

    /// Merge the bundled defaults with any `errchain.toml` the user keeps.
    ///
    /// Later layers win:
    /// 1. `errchain.toml` compiled into the library
    /// 2. `~/.config/errchain/errchain.toml`
    /// 3. `./errchain.toml`
    ///
    /// Either user file may be absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a user file exists but cannot be merged.
    #[instrument]
    pub fn load() -> ErrchainResult<Self> {
        debug!("Merging errchain settings: bundled, home, working directory");

        const DEFAULT_CONFIG: &str = include_str!("../../../errchain.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/errchain/errchain.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("errchain").required(false));

        builder
            .build()
            .map_err(|e| {
                ErrchainError::from(ConfigError::new(format!(
                    "Cannot merge errchain settings: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ErrchainError::from(ConfigError::new(format!(
                    "Invalid merged errchain settings: {}",
                    e
                )))
            })
    }

    /// Bundled defaults only, ignoring user files.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> ErrchainResult<Self> {
        const DEFAULT_CONFIG: &str = include_str!("../../../errchain.toml");

        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| {
                ErrchainError::from(ConfigError::new(format!(
                    "Invalid bundled errchain settings: {}",
                    e
                )))
            })
    }
}
