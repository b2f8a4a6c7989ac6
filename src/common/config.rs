//! Configuration for clockpool.
//!
//! Page geometry is fixed at compile time. Pool sizing is runtime
//! configuration, layered from defaults, an optional file and
//! `CLOCKPOOL_*` environment variables.

use serde::Deserialize;

use crate::common::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so frames can be handed to
/// Direct I/O without re-alignment.
pub const PAGE_SIZE: usize = 4096;

/// Number of frames used when no pool size is configured.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Prefix for environment overrides, e.g. `CLOCKPOOL_POOL_SIZE=128`.
pub const ENV_PREFIX: &str = "CLOCKPOOL";

/// Runtime configuration of a buffer pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool. Must be positive.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl BufferPoolConfig {
    /// Build a validated configuration for `pool_size` frames.
    pub fn new(pool_size: usize) -> Result<Self> {
        let cfg = Self { pool_size };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from defaults, then `file` (if non-empty), then
    /// the environment.
    pub fn load(file: &str) -> Result<Self> {
        let mut builder =
            config::Config::builder().set_default("pool_size", DEFAULT_POOL_SIZE as u64)?;
        if !file.is_empty() {
            builder = builder.add_source(config::File::with_name(file));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::InvalidConfig("pool_size must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}
