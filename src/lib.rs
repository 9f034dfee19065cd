//! # smc-signal - Smart Money Concept signal engine
//!
//! Rule-based signal generator for a single instrument. The engine inspects the
//! last few candles of an entry-timeframe series for smart-money price action
//! (break of structure, market structure shift, order block, fair value gap,
//! liquidity sweep), filters the result with an EMA bias computed on a
//! higher-timeframe series and derives entry / stop-loss / take-profit levels.
//!
//! ## Quick Start
//!
//! ```rust
//! use smc_signal::prelude::*;
//!
//! let entry: Vec<Candle> = (0..100)
//!     .map(|i| {
//!         let base = 16000.0 + i as f64 * 2.0;
//!         Candle::new(base, base + 20.0, base - 20.0, base + 10.0)
//!     })
//!     .collect();
//! let bias: Vec<Candle> = (0..20)
//!     .map(|i| {
//!         let base = 16000.0 + i as f64 * 10.0;
//!         Candle::new(base, base + 50.0, base - 50.0, base + 20.0)
//!     })
//!     .collect();
//!
//! let engine = EngineBuilder::new().build().unwrap();
//! let signal = engine.analyze(&entry, &bias);
//! assert!(signal.strength <= 100);
//! ```

pub mod bias;
pub mod config;
pub mod confluence;
pub mod detectors;
pub mod engine;
pub mod feed;
pub mod journal;
pub mod signal;

pub mod prelude {
    pub use crate::{
        // Bias
        bias::{ema_bias, ema_last, BiasReading},
        // Config
        config::{BotConfig, StrategyConfig},
        // Confluence
        confluence::ConfluenceResult,
        // Detectors
        detectors::{
            BreakOfStructureDetector, FairValueGapDetector, LiquiditySweepDetector,
            MarketStructureShiftDetector, OrderBlockDetector,
        },
        // Engine
        engine::{analyze_parallel, EngineBuilder, InstrumentSignal, SmcEngine, StrategyStatus},
        // Feed
        feed::{CandleSource, OfflineSource, Poller, PriceChange, ReplaySource},
        // Journal
        journal::{SignalJournal, DEFAULT_JOURNAL_CAPACITY},
        // Signal
        signal::{strength_for, NoSignalReason, SignalDetails, SignalDirection, SignalResult},
        BuiltinDetector,
        Candle,
        Detection,
        Direction,
        OHLCVExt,
        PatternId,
        Period,
        Result,
        RiskReward,
        SignalError,
        SmcDetector,
        OHLCV,
        validate_series,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors raised while building engines or loading configuration.
///
/// Analysis itself never fails; see [`engine::SmcEngine::analyze`].
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SignalError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Reward multiple of the stop distance (finite, > 0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RiskReward(f64);

impl RiskReward {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(SignalError::InvalidValue(
                "Risk/reward cannot be NaN or infinite",
            ));
        }
        if value <= 0.0 {
            return Err(SignalError::OutOfRange {
                field: "risk_reward_ratio",
                value,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for RiskReward {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for RiskReward {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        RiskReward::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    /// Volume is carried for callers but never read by the engine.
    fn volume(&self) -> Option<f64> {
        None
    }

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> Option<f64> {
        (*self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (*self).timestamp()
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(SignalError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(SignalError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(SignalError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Validate every bar of a series, reporting the first offending index.
pub fn validate_series<T: OHLCV>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            SignalError::InvalidOHLCV { reason, .. } => {
                SignalError::InvalidOHLCV { index: i, reason }
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Plain candle row for callers without their own bar type.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume: None,
            time: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        self.time
    }
}

// ============================================================
// DETECTION - result of a single detector (Copy, no allocations)
// ============================================================

/// Unique identifier for a detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Direction of a detected pattern or of the EMA bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Bullish => "bullish",
            Direction::Bearish => "bearish",
        }
    }
}

/// A detector that fired. Absence is represented by `None` at the call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub pattern_id: PatternId,
    pub direction: Direction,
    /// Order block: support (bullish) or resistance (bearish).
    /// Fair value gap: gap midpoint.
    pub level: Option<f64>,
}

// ============================================================
// DETECTOR TRAIT
// ============================================================

/// A price-action detector evaluated on the tail of a series.
///
/// Detectors never fail: a series shorter than [`SmcDetector::min_bars`]
/// simply yields `None`.
pub trait SmcDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn min_bars(&self) -> usize;
    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection>;
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - enum dispatch, no vtable
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            /// Every builtin detector with its default configuration, in evaluation order.
            pub fn all() -> Vec<BuiltinDetector> {
                vec![$(Self::$variant(<$detector>::default())),*]
            }

            #[inline]
            pub fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection> {
                match self {
                    $(Self::$variant(d) => SmcDetector::detect(d, bars)),*
                }
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => SmcDetector::id(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => SmcDetector::min_bars(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    BreakOfStructure(BreakOfStructureDetector),
    MarketStructureShift(MarketStructureShiftDetector),
    OrderBlock(OrderBlockDetector),
    FairValueGap(FairValueGapDetector),
    LiquiditySweep(LiquiditySweepDetector),
}

// ============================================================
// TESTS
// ============================================================
