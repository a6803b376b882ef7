//! Cart configuration
//!
//! Settings are read from YAML; every field is optional.
//!
//! ```yaml
//! storage_key: cart
//! currency: USD
//! quota_bytes: 5242880
//! discount:
//!   per_unit: 2%
//!   cap: "0.20"
//! ```

use std::{fs, io, path::Path};

use rust_decimal::Decimal;
use rusty_money::iso::{BDT, Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    discounts::{DiscountError, DiscountPolicy},
    persistence::DEFAULT_SLOT_KEY,
};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The YAML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_norway::Error),

    /// A rate is neither a percentage nor a fraction.
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// The discount rates are out of range.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The currency code is not supported.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Discount settings, as percentages ("2%") or fractions ("0.02").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscountConfig {
    /// Rate taken off per unit beyond the first
    pub per_unit: String,

    /// Maximum rate
    pub cap: String,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            per_unit: "0.02".to_string(),
            cap: "0.20".to_string(),
        }
    }
}

/// Cart settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Slot the cart is persisted under
    pub storage_key: String,

    /// ISO code of the display currency
    pub currency: String,

    /// Discount policy
    pub discount: DiscountConfig,

    /// Byte limit of the storage area, unlimited when absent
    pub quota_bytes: Option<usize>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_SLOT_KEY.to_string(),
            currency: "USD".to_string(),
            discount: DiscountConfig::default(),
            quota_bytes: None,
        }
    }
}

impl CartConfig {
    /// Parse and check a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is malformed, the currency is
    /// unknown or the discount rates are invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(yaml)?;

        config.currency()?;
        config.discount_policy()?;

        Ok(config)
    }

    /// Read and check a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`CartConfig::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&yaml)
    }

    /// Display currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for unsupported codes.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        match self.currency.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(USD),
            "GBP" => Ok(GBP),
            "EUR" => Ok(EUR),
            "BDT" => Ok(BDT),
            _ => Err(ConfigError::UnknownCurrency(self.currency.clone())),
        }
    }

    /// Discount policy described by the `discount` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRate`] for unparsable rates and
    /// [`ConfigError::Discount`] for rates outside `[0, 1]`.
    pub fn discount_policy(&self) -> Result<DiscountPolicy, ConfigError> {
        let per_unit = parse_rate(&self.discount.per_unit)?;
        let cap = parse_rate(&self.discount.cap)?;

        Ok(DiscountPolicy::from_rates(per_unit, cap)?)
    }
}

/// Parse a rate written as a percentage ("15%") or a fraction ("0.15").
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRate`] if the string is not a number.
pub fn parse_rate(s: &str) -> Result<Decimal, ConfigError> {
    let trimmed = s.trim();

    if let Some(percent) = trimmed.strip_suffix('%') {
        let value = percent
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| ConfigError::InvalidRate(s.to_string()))?;

        return value
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(|| ConfigError::InvalidRate(s.to_string()));
    }

    trimmed
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidRate(s.to_string()))
}
