//! Table sizing and growth policy.

use thiserror::Error;

/// Bin count a table starts with, and returns to after `clear`.
pub const DEFAULT_INITIAL_BINS: usize = 50;
/// Growth runs once `entries / bins` exceeds this.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.5;
/// Growth runs once the chain an add landed in is longer than this.
pub const DEFAULT_MAX_CHAIN_LEN: usize = 3;
/// New bin count is `ceil(bins * factor)`.
pub const DEFAULT_GROWTH_FACTOR: f64 = 2.3;
/// Smallest accepted growth factor. Anything at or below 1.0 never lowers the
/// load factor and values just above it need an unbounded number of steps.
pub const MIN_GROWTH_FACTOR: f64 = 1.1;
/// Smallest accepted max load factor. Growth after an add runs until
/// `bins >= entries / max_load_factor`; a tinier limit asks for more bins than
/// can be allocated.
pub const MIN_MAX_LOAD_FACTOR: f64 = 0.01;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("initial bin count must be at least 1")]
    ZeroBins,
    #[error("max load factor must be finite and at least 0.01, got {0}")]
    LoadFactor(f64),
    #[error("max chain length must be at least 1")]
    ChainLength,
    #[error("growth factor must be finite and at least 1.1, got {0}")]
    GrowthFactor(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub initial_bins: usize,
    pub max_load_factor: f64,
    pub max_chain_len: usize,
    pub growth_factor: f64,
}

impl TableConfig {
    pub const fn new() -> Self {
        Self {
            initial_bins: DEFAULT_INITIAL_BINS,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            max_chain_len: DEFAULT_MAX_CHAIN_LEN,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }

    pub fn initial_bins(mut self, bins: usize) -> Self {
        self.initial_bins = bins;
        self
    }

    pub fn max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    pub fn max_chain_len(mut self, len: usize) -> Self {
        self.max_chain_len = len;
        self
    }

    pub fn growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_bins == 0 {
            return Err(ConfigError::ZeroBins);
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor < MIN_MAX_LOAD_FACTOR {
            return Err(ConfigError::LoadFactor(self.max_load_factor));
        }
        if self.max_chain_len == 0 {
            return Err(ConfigError::ChainLength);
        }
        check_growth_factor(self.growth_factor)
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_growth_factor(factor: f64) -> Result<(), ConfigError> {
    if factor.is_finite() && factor >= MIN_GROWTH_FACTOR {
        Ok(())
    } else {
        Err(ConfigError::GrowthFactor(factor))
    }
}
