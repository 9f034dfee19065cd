//! Strategy and bot configuration
//!
//! The strategy section is what the engine consumes. The surrounding bot
//! config carries the broker symbol, the execution switch and the list of
//! active strategies; the poller reads those.
//!
//! # Example
//!
//! ```rust
//! use smc_signal::config::StrategyConfig;
//!
//! let config = StrategyConfig::from_json_str(r#"{"ema_period": 21, "rr_ratio": 2.5}"#).unwrap();
//! assert_eq!(config.ema_period.get(), 21);
//! assert_eq!(config.entry_timeframe, "M5");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Period, Result, RiskReward, SignalError};

// ============================================================
// DEFAULTS
// ============================================================

pub const DEFAULT_ENTRY_TIMEFRAME: &str = "M5";
pub const DEFAULT_BIAS_TIMEFRAME: &str = "H1";
pub const DEFAULT_EMA_PERIOD: usize = 50;
pub const DEFAULT_MIN_CANDLES: usize = 100;
pub const DEFAULT_RISK_REWARD: f64 = 3.0;
pub const DEFAULT_TP_MULTIPLIER: f64 = 3.0;
pub const DEFAULT_SYMBOL: &str = "US30m";

fn default_entry_timeframe() -> String {
    DEFAULT_ENTRY_TIMEFRAME.to_string()
}

fn default_bias_timeframe() -> String {
    DEFAULT_BIAS_TIMEFRAME.to_string()
}

fn default_ema_period() -> Period {
    Period::new_const(DEFAULT_EMA_PERIOD)
}

fn default_min_candles() -> Period {
    Period::new_const(DEFAULT_MIN_CANDLES)
}

fn default_risk_reward() -> RiskReward {
    RiskReward::new_const(DEFAULT_RISK_REWARD)
}

fn default_tp_multiplier() -> f64 {
    DEFAULT_TP_MULTIPLIER
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

// ============================================================
// STRATEGY CONFIG
// ============================================================

/// Immutable engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Descriptive label of the entry series timeframe
    #[serde(default = "default_entry_timeframe")]
    pub entry_timeframe: String,
    /// Descriptive label of the bias series timeframe
    #[serde(default = "default_bias_timeframe")]
    pub bias_timeframe: String,
    #[serde(default = "default_ema_period")]
    pub ema_period: Period,
    /// Legacy field, read and kept but never used by the analysis.
    #[serde(default = "default_tp_multiplier")]
    pub tp_multiplier: f64,
    /// Minimum entry-series length
    #[serde(default = "default_min_candles")]
    pub min_candles: Period,
    #[serde(
        default = "default_risk_reward",
        rename = "rr_ratio",
        alias = "risk_reward_ratio"
    )]
    pub risk_reward_ratio: RiskReward,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            entry_timeframe: default_entry_timeframe(),
            bias_timeframe: default_bias_timeframe(),
            ema_period: default_ema_period(),
            tp_multiplier: default_tp_multiplier(),
            min_candles: default_min_candles(),
            risk_reward_ratio: default_risk_reward(),
        }
    }
}

impl StrategyConfig {
    /// Parse a strategy section from JSON; missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that serde cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.entry_timeframe.trim().is_empty() {
            return Err(SignalError::InvalidConfig(
                "entry_timeframe must not be empty".into(),
            ));
        }
        if self.bias_timeframe.trim().is_empty() {
            return Err(SignalError::InvalidConfig(
                "bias_timeframe must not be empty".into(),
            ));
        }
        if !self.tp_multiplier.is_finite() {
            return Err(SignalError::InvalidValue("tp_multiplier must be finite"));
        }
        Ok(())
    }
}

// ============================================================
// BOT CONFIG
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerSection {
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSection {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmcSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategiesSection {
    #[serde(default)]
    pub active: Vec<String>,
    #[serde(default)]
    pub smc: SmcSection,
}

/// Whole-bot configuration file. Unknown sections are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub broker: BrokerSection,
    #[serde(default)]
    pub execution: ExecutionSection,
    #[serde(default)]
    pub strategies: StrategiesSection,
}

impl BotConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.strategies.smc.strategy.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// SMC listed as active and switched on
    pub fn smc_enabled(&self) -> bool {
        self.strategies.smc.enabled && self.strategies.active.iter().any(|s| s == "smc")
    }

    pub fn strategy(&self) -> &StrategyConfig {
        &self.strategies.smc.strategy
    }
}

// ============================================================
// TESTS
// ============================================================
