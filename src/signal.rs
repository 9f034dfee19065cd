//! Signal result types and the confluence strength table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Trade direction emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Buy,
    Sell,
    None,
}

impl SignalDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalDirection::Buy => "BUY",
            SignalDirection::Sell => "SELL",
            SignalDirection::None => "NONE",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a call ended without a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoSignalReason {
    #[serde(rename = "Insufficient data")]
    InsufficientData,
    #[serde(rename = "No EMA bias")]
    NoBias,
    #[serde(rename = "No SMC entry conditions")]
    NoEntryConditions,
    #[serde(rename = "Signal misaligned with EMA bias")]
    Misaligned,
}

impl NoSignalReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NoSignalReason::InsufficientData => "Insufficient data",
            NoSignalReason::NoBias => "No EMA bias",
            NoSignalReason::NoEntryConditions => "No SMC entry conditions",
            NoSignalReason::Misaligned => "Signal misaligned with EMA bias",
        }
    }
}

impl fmt::Display for NoSignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-detector flags and bias context attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalDetails {
    pub bos: bool,
    pub mss: bool,
    #[serde(rename = "ob")]
    pub order_block: bool,
    pub fvg: bool,
    pub liquidity_sweep: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fvg_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_bias: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_value: Option<f64>,
    pub confluence_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_tf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_tf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoSignalReason>,
}

impl SignalDetails {
    /// Number of detector flags set
    pub fn flags_set(&self) -> usize {
        [
            self.bos,
            self.mss,
            self.order_block,
            self.fvg,
            self.liquidity_sweep,
        ]
        .iter()
        .filter(|f| **f)
        .count()
    }
}

/// Output of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    #[serde(rename = "signal")]
    pub direction: SignalDirection,
    /// 0 for [`SignalDirection::None`], otherwise one of 30/60/80/95/100
    pub strength: u8,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    #[serde(rename = "sl_distance")]
    pub stop_distance: Option<f64>,
    #[serde(rename = "rr_ratio")]
    pub risk_reward_ratio: f64,
    pub details: SignalDetails,
}

impl SignalResult {
    /// Empty result carrying `reason`.
    pub fn no_signal(reason: NoSignalReason, risk_reward_ratio: f64) -> Self {
        Self {
            direction: SignalDirection::None,
            strength: 0,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            stop_distance: None,
            risk_reward_ratio,
            details: SignalDetails {
                reason: Some(reason),
                ..SignalDetails::default()
            },
        }
    }

    #[inline]
    pub fn is_signal(&self) -> bool {
        self.direction != SignalDirection::None
    }

    #[inline]
    pub fn reason(&self) -> Option<NoSignalReason> {
        self.details.reason
    }
}

/// Map a confluence count onto the 0-100 strength scale.
///
/// Counts outside 1..=5 fall back to 50.
pub fn strength_for(confluence_count: u8) -> u8 {
    let score = match confluence_count {
        1 => 30,
        2 => 60,
        3 => 80,
        4 => 95,
        5 => 100,
        _ => 50,
    };
    score.min(100)
}
