//! Configuration loading and validation.
//!
//! Config is read from a TOML file, validated as a whole, and then
//! projected into the typed pieces the engine consumes ([`CostModel`],
//! [`RiskLimits`], [`VenueCapabilityRegistry`]). Every field has a default,
//! so an empty file is a valid config.

use std::collections::HashMap;
use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::engine::{CostModel, RiskLimits, VenueCapability, VenueCapabilityRegistry};
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub costs: CostConfig,
    pub limits: LimitsConfig,
    pub venues: VenuesConfig,
    pub logging: LoggingConfig,
}

/// Starting state of the paper ledger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub initial_cash: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_cash: Decimal::from(10_000),
        }
    }
}

/// Fee, slippage, and depth parameters for the fill simulator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub fee_bps: Decimal,
    pub slippage_bps: Decimal,
    pub depth_fraction: Decimal,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            fee_bps: Decimal::from(10),
            slippage_bps: Decimal::from(20),
            depth_fraction: Decimal::new(5, 2), // 0.05
        }
    }
}

/// Risk limit knobs, one per validator check.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub min_net_edge: Decimal,
    pub min_gross_edge: Decimal,
    pub min_buy_price: Decimal,
    pub depth_multiple: Decimal,
    pub min_time_to_expiry_secs: u32,
    pub max_open_positions: usize,
    pub max_allocation_fraction: Decimal,
    pub min_market_liquidity: Decimal,
    pub disabled_kinds: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_net_edge: Decimal::new(5, 3),   // 0.005
            min_gross_edge: Decimal::new(1, 2), // 0.01
            min_buy_price: Decimal::new(2, 2),  // 0.02
            depth_multiple: Decimal::ONE,
            min_time_to_expiry_secs: 3_600,
            max_open_positions: 20,
            max_allocation_fraction: Decimal::new(5, 2), // 0.05
            min_market_liquidity: Decimal::from(500),
            disabled_kinds: Vec::new(),
        }
    }
}

/// Venue shorting capabilities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VenuesConfig {
    /// Capability assumed for venues not listed in `overrides`.
    pub default: VenueCapability,
    pub overrides: HashMap<String, VenueCapability>,
}

impl Default for VenuesConfig {
    fn default() -> Self {
        Self {
            default: VenueCapability::BuyOnly,
            overrides: HashMap::new(),
        }
    }
}

/// Logging output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `paperedge=debug`.
    pub level: String,
    /// Either `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// value fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first failing field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.initial_cash <= Decimal::ZERO {
            return Err(invalid("ledger.initial_cash", "must be positive"));
        }
        if self.costs.fee_bps < Decimal::ZERO {
            return Err(invalid("costs.fee_bps", "must be non-negative"));
        }
        if self.costs.slippage_bps < Decimal::ZERO {
            return Err(invalid("costs.slippage_bps", "must be non-negative"));
        }
        if self.costs.depth_fraction <= Decimal::ZERO || self.costs.depth_fraction > Decimal::ONE {
            return Err(invalid("costs.depth_fraction", "must be in (0, 1]"));
        }
        if self.limits.max_allocation_fraction <= Decimal::ZERO
            || self.limits.max_allocation_fraction > Decimal::ONE
        {
            return Err(invalid("limits.max_allocation_fraction", "must be in (0, 1]"));
        }
        if self.limits.min_buy_price < Decimal::ZERO || self.limits.min_buy_price > Decimal::ONE {
            return Err(invalid("limits.min_buy_price", "must be in [0, 1]"));
        }
        if self.limits.depth_multiple < Decimal::ZERO {
            return Err(invalid("limits.depth_multiple", "must be non-negative"));
        }
        if self.limits.min_market_liquidity < Decimal::ZERO {
            return Err(invalid("limits.min_market_liquidity", "must be non-negative"));
        }
        if self.limits.max_open_positions == 0 {
            return Err(invalid("limits.max_open_positions", "must be at least 1"));
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(invalid(
                    "logging.format",
                    format!("unknown format {other:?}, expected \"pretty\" or \"json\""),
                ));
            }
        }
        Ok(())
    }

    /// Project the cost section into the fill simulator's model.
    #[must_use]
    pub fn cost_model(&self) -> CostModel {
        CostModel {
            fee_bps: self.costs.fee_bps,
            slippage_bps: self.costs.slippage_bps,
            depth_fraction: self.costs.depth_fraction,
        }
    }

    /// Project the limits section into validator limits.
    #[must_use]
    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits {
            disabled_kinds: self.limits.disabled_kinds.clone(),
            min_net_edge: self.limits.min_net_edge,
            min_gross_edge: self.limits.min_gross_edge,
            min_buy_price: self.limits.min_buy_price,
            depth_multiple: self.limits.depth_multiple,
            min_time_to_expiry: Duration::seconds(i64::from(self.limits.min_time_to_expiry_secs)),
            max_open_positions: self.limits.max_open_positions,
            max_allocation_fraction: self.limits.max_allocation_fraction,
            min_market_liquidity: self.limits.min_market_liquidity,
        }
    }

    /// Build the venue capability registry from the venues section.
    #[must_use]
    pub fn venue_registry(&self) -> VenueCapabilityRegistry {
        let mut registry = VenueCapabilityRegistry::new(self.venues.default);
        for (venue, capability) in &self.venues.overrides {
            registry.register(venue.as_str().into(), *capability);
        }
        registry
    }

    /// Install the global tracing subscriber per the logging section.
    ///
    /// A second call is a no-op, so tests can initialize freely.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the filter directive does
    /// not parse.
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        let filter = EnvFilter::try_new(&self.logging.level)
            .map_err(|e| invalid("logging.level", e.to_string()))?;
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let result = if self.logging.format == "json" {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        // Already-initialized is fine; the first subscriber wins.
        drop(result);
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}
