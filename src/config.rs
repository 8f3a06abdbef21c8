//! Engine configuration.
//!
//! Settings can be built in code or, with the `config` feature (on by
//! default), read from TOML:
//!
//! ```toml
//! environment = "production"
//! tax_rate = "19"
//! totals_tolerance = 1
//! low_folio_threshold = 25
//! caf_dir = "/etc/dte/caf"
//! ```

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::caf::{DEFAULT_LOW_STOCK_THRESHOLD, FolioAllocator};
use crate::core::{DteError, IVA_RATE};

/// SII environment the documents are issued against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// maullin.sii.cl, test folios.
    #[default]
    Certification,
    /// palena.sii.cl.
    Production,
}

/// Settings shared by the allocator and the document builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub environment: Environment,
    /// IVA percentage.
    pub tax_rate: Decimal,
    /// Allowed difference, in pesos, between declared and computed totals.
    pub totals_tolerance: i64,
    /// Remaining folios at or below which claims log a warning.
    pub low_folio_threshold: u64,
    /// Directory of CAF files loaded by [`EngineConfig::allocator`].
    pub caf_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            tax_rate: IVA_RATE,
            totals_tolerance: 1,
            low_folio_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            caf_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    #[cfg(feature = "config")]
    pub fn from_file(path: &std::path::Path) -> Result<Self, DteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml(content: &str) -> Result<Self, DteError> {
        let config: Self =
            toml::from_str(content).map_err(|e| DteError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    #[cfg(feature = "config")]
    pub fn to_toml(&self) -> Result<String, DteError> {
        toml::to_string_pretty(self).map_err(|e| DteError::Config(e.to_string()))
    }

    /// Reject values no document could be issued with.
    pub fn check(&self) -> Result<(), DteError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE_HUNDRED {
            return Err(DteError::Config(format!(
                "tax_rate {} must be between 0 and 100",
                self.tax_rate
            )));
        }
        if self.totals_tolerance < 0 {
            return Err(DteError::Config(format!(
                "totals_tolerance {} must not be negative",
                self.totals_tolerance
            )));
        }
        Ok(())
    }

    /// An allocator with this configuration's threshold, preloaded from
    /// `caf_dir` when one is set.
    pub fn allocator(&self) -> Result<FolioAllocator, DteError> {
        let allocator = FolioAllocator::new().with_low_stock_threshold(self.low_folio_threshold);
        if let Some(dir) = &self.caf_dir {
            let loaded = allocator.load_caf_dir(dir)?;
            tracing::info!(
                environment = ?self.environment,
                dir = %dir.display(),
                files = loaded,
                "folio allocator initialized"
            );
        }
        Ok(allocator)
    }
}
