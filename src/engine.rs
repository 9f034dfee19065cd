//! Signal engine: bias filter, confluence gate, alignment and trade levels

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{
    bias::ema_bias,
    config::StrategyConfig,
    confluence::ConfluenceResult,
    journal::SignalJournal,
    signal::{strength_for, NoSignalReason, SignalDetails, SignalDirection, SignalResult},
    BuiltinDetector, Direction, Period, Result, RiskReward, OHLCV,
};

/// Minimum bias-series length; the EMA comparison needs a history.
pub const MIN_BIAS_CANDLES: usize = 2;

// ============================================================
// ENGINE
// ============================================================

/// Stateless SMC signal engine.
///
/// Owns its configuration and detector set; every [`SmcEngine::analyze`]
/// call is a pure function of its two input series.
#[derive(Debug, Clone)]
pub struct SmcEngine {
    config: StrategyConfig,
    detectors: Vec<BuiltinDetector>,
}

impl SmcEngine {
    pub fn new(config: StrategyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detectors: BuiltinDetector::all(),
        })
    }

    #[inline]
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    #[inline]
    fn rr(&self) -> f64 {
        self.config.risk_reward_ratio.get()
    }

    fn no_signal(&self, reason: NoSignalReason) -> SignalResult {
        debug!(reason = reason.as_str(), "no signal");
        SignalResult::no_signal(reason, self.rr())
    }

    /// Evaluate the latest bars of `entry` against the EMA bias of `bias`.
    ///
    /// Never fails: every path ends in a complete [`SignalResult`], with a
    /// reason attached when the direction is [`SignalDirection::None`].
    pub fn analyze<E: OHLCV, B: OHLCV>(&self, entry: &[E], bias: &[B]) -> SignalResult {
        if entry.len() < self.config.min_candles.get() || bias.len() < MIN_BIAS_CANDLES {
            return self.no_signal(NoSignalReason::InsufficientData);
        }

        // Step 1: higher-timeframe bias
        let Some(reading) = ema_bias(bias, self.config.ema_period) else {
            return self.no_signal(NoSignalReason::InsufficientData);
        };
        let Some(bias_direction) = reading.direction else {
            return self.no_signal(NoSignalReason::NoBias);
        };

        // Step 2: price-action confluence on the entry series
        let smc = ConfluenceResult::evaluate_with(&self.detectors, entry);
        if !smc.is_valid() {
            return self.no_signal(NoSignalReason::NoEntryConditions);
        }

        // Step 3: the BOS direction must agree with the bias
        let direction = match (smc.pattern_type, bias_direction) {
            (Some(Direction::Bullish), Direction::Bullish) => SignalDirection::Buy,
            (Some(Direction::Bearish), Direction::Bearish) => SignalDirection::Sell,
            _ => return self.no_signal(NoSignalReason::Misaligned),
        };

        // Step 4: entry, stop and target
        let Some(entry_price) = entry.last().map(|b| b.close()) else {
            return self.no_signal(NoSignalReason::InsufficientData);
        };
        let Some(levels) = TradeLevels::compute(direction, entry_price, &smc, self.rr()) else {
            return self.no_signal(NoSignalReason::NoEntryConditions);
        };

        let strength = strength_for(smc.confluence_count);

        debug!(
            signal = direction.as_str(),
            strength,
            entry_price = levels.entry_price,
            stop_loss = levels.stop_loss,
            take_profit = levels.take_profit,
            "signal"
        );

        SignalResult {
            direction,
            strength,
            entry_price: Some(levels.entry_price),
            stop_loss: Some(levels.stop_loss),
            take_profit: Some(levels.take_profit),
            stop_distance: Some(levels.stop_distance),
            risk_reward_ratio: self.rr(),
            details: SignalDetails {
                bos: smc.bos,
                mss: smc.mss,
                order_block: smc.order_block,
                fvg: smc.fvg,
                liquidity_sweep: smc.liquidity_sweep,
                fvg_level: smc.fvg_level,
                ema_bias: Some(bias_direction),
                ema_value: Some(reading.ema),
                confluence_count: smc.confluence_count,
                entry_tf: Some(self.config.entry_timeframe.clone()),
                bias_tf: Some(self.config.bias_timeframe.clone()),
                reason: None,
            },
        }
    }

    /// Strategy status for dashboards, combined with a caller-owned journal.
    pub fn status(&self, journal: &SignalJournal) -> StrategyStatus {
        StrategyStatus {
            strategy: "SMC",
            enabled: true,
            entry_timeframe: self.config.entry_timeframe.clone(),
            bias_timeframe: self.config.bias_timeframe.clone(),
            ema_period: self.config.ema_period.get(),
            rr_ratio: self.rr(),
            last_signal: journal.last_signal(),
            total_signals: journal.total_signals(),
        }
    }
}

// ============================================================
// TRADE LEVELS
// ============================================================

/// Entry / stop / target triple for an aligned signal.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TradeLevels {
    entry_price: f64,
    stop_loss: f64,
    stop_distance: f64,
    take_profit: f64,
}

impl TradeLevels {
    /// The stop distance sign is not checked: a stop on the wrong side of the
    /// entry yields a negative distance and a target behind the entry.
    /// Returns `None` when no stop reference exists or any level is not finite.
    fn compute(
        direction: SignalDirection,
        entry_price: f64,
        smc: &ConfluenceResult,
        rr: f64,
    ) -> Option<Self> {
        let (stop_loss, stop_distance, take_profit) = match direction {
            SignalDirection::Buy => {
                let stop_loss = smc.support?;
                let distance = entry_price - stop_loss;
                (stop_loss, distance, entry_price + distance * rr)
            }
            SignalDirection::Sell => {
                let stop_loss = smc.resistance?;
                let distance = stop_loss - entry_price;
                (stop_loss, distance, entry_price - distance * rr)
            }
            SignalDirection::None => return None,
        };

        let levels = Self {
            entry_price,
            stop_loss,
            stop_distance,
            take_profit,
        };
        levels.is_finite().then_some(levels)
    }

    fn is_finite(&self) -> bool {
        self.entry_price.is_finite()
            && self.stop_loss.is_finite()
            && self.stop_distance.is_finite()
            && self.take_profit.is_finite()
    }
}

// ============================================================
// STATUS
// ============================================================

/// Snapshot of the strategy configuration and its signal history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStatus {
    pub strategy: &'static str,
    pub enabled: bool,
    pub entry_timeframe: String,
    pub bias_timeframe: String,
    pub ema_period: usize,
    pub rr_ratio: f64,
    pub last_signal: Option<SignalResult>,
    pub total_signals: usize,
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating SmcEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: StrategyConfig,
    ema_period: Option<usize>,
    min_candles: Option<usize>,
    risk_reward: Option<f64>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: StrategyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn timeframes(mut self, entry: impl Into<String>, bias: impl Into<String>) -> Self {
        self.config.entry_timeframe = entry.into();
        self.config.bias_timeframe = bias.into();
        self
    }

    pub fn ema_period(mut self, period: usize) -> Self {
        self.ema_period = Some(period);
        self
    }

    pub fn min_candles(mut self, count: usize) -> Self {
        self.min_candles = Some(count);
        self
    }

    pub fn risk_reward(mut self, ratio: f64) -> Self {
        self.risk_reward = Some(ratio);
        self
    }

    /// Build the engine, validating every override
    pub fn build(self) -> Result<SmcEngine> {
        let mut config = self.config;
        if let Some(period) = self.ema_period {
            config.ema_period = Period::new(period)?;
        }
        if let Some(count) = self.min_candles {
            config.min_candles = Period::new(count)?;
        }
        if let Some(ratio) = self.risk_reward {
            config.risk_reward_ratio = RiskReward::new(ratio)?;
        }
        SmcEngine::new(config)
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

/// Result of analyzing a single instrument
#[derive(Debug, Clone)]
pub struct InstrumentSignal {
    pub symbol: String,
    pub signal: SignalResult,
}

/// Analyze several instruments concurrently, preserving input order.
pub fn analyze_parallel<'a, T, I>(engine: &SmcEngine, instruments: I) -> Vec<InstrumentSignal>
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T], &'a [T])>,
{
    instruments
        .into_par_iter()
        .map(|(symbol, entry, bias)| InstrumentSignal {
            symbol: symbol.to_string(),
            signal: engine.analyze(entry, bias),
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================
