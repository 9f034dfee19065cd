//! Market data capability and the polling step that feeds the engine
//!
//! The engine only ever sees plain candle slices. Where those come from is
//! behind [`CandleSource`]: a broker-backed adapter in production, the
//! [`OfflineSource`] null adapter when no broker is reachable, or a
//! [`ReplaySource`] holding pre-loaded series.

use std::{collections::HashMap, sync::Arc};

use tracing::{info, warn};

use crate::{
    config::{BotConfig, DEFAULT_SYMBOL},
    engine::SmcEngine,
    journal::SignalJournal,
    signal::SignalResult,
    validate_series, Candle, Result,
};

/// Bias-series depth requested on every poll.
pub const DEFAULT_BIAS_CANDLES: usize = 20;

// ============================================================
// SOURCES
// ============================================================

/// Provider of candle series. "No data" is `None`, never an error.
pub trait CandleSource: Send + Sync {
    /// Up to `count` most recent candles, oldest first.
    fn fetch(&self, symbol: &str, timeframe: &str, count: usize) -> Option<Vec<Candle>>;

    /// Whether the source is backed by a live market connection.
    fn is_live(&self) -> bool;
}

/// Null adapter used when no broker is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl CandleSource for OfflineSource {
    fn fetch(&self, _symbol: &str, _timeframe: &str, _count: usize) -> Option<Vec<Candle>> {
        None
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// In-memory series keyed by symbol and timeframe.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    series: HashMap<(String, String), Vec<Candle>>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(
        mut self,
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        bars: Vec<Candle>,
    ) -> Self {
        self.insert(symbol, timeframe, bars);
        self
    }

    pub fn insert(
        &mut self,
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        bars: Vec<Candle>,
    ) {
        self.series.insert((symbol.into(), timeframe.into()), bars);
    }
}

impl CandleSource for ReplaySource {
    fn fetch(&self, symbol: &str, timeframe: &str, count: usize) -> Option<Vec<Candle>> {
        let bars = self
            .series
            .get(&(symbol.to_string(), timeframe.to_string()))?;
        if bars.is_empty() || count == 0 {
            return None;
        }
        let start = bars.len().saturating_sub(count);
        Some(bars[start..].to_vec())
    }

    fn is_live(&self) -> bool {
        false
    }
}

// ============================================================
// PRICE CHANGE
// ============================================================

/// Change between two prices; the percentage is 0 when the base is not positive.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PriceChange {
    pub change: f64,
    pub change_pct: f64,
}

impl PriceChange {
    pub fn between(previous: f64, current: f64) -> Self {
        let change = current - previous;
        let change_pct = if previous > 0.0 {
            change / previous * 100.0
        } else {
            0.0
        };
        Self { change, change_pct }
    }
}

// ============================================================
// POLLER
// ============================================================

/// One fetch-analyze-record step of the executor loop.
///
/// Scheduling (interval, background thread) and order placement belong to
/// the caller.
pub struct Poller<S: CandleSource> {
    engine: SmcEngine,
    source: S,
    journal: Arc<SignalJournal>,
    symbol: String,
    bias_candles: usize,
    execution_enabled: bool,
}

impl<S: CandleSource> Poller<S> {
    pub fn new(engine: SmcEngine, source: S, journal: Arc<SignalJournal>) -> Self {
        if !source.is_live() {
            warn!("candle source is offline; poller runs in demo mode");
        }
        Self {
            engine,
            source,
            journal,
            symbol: DEFAULT_SYMBOL.to_string(),
            bias_candles: DEFAULT_BIAS_CANDLES,
            execution_enabled: false,
        }
    }

    /// Build from the bot configuration. `Ok(None)` when SMC is not active.
    pub fn from_config(
        config: &BotConfig,
        source: S,
        journal: Arc<SignalJournal>,
    ) -> Result<Option<Self>> {
        if !config.smc_enabled() {
            info!("SMC strategy not active or enabled in config; poller stays idle");
            return Ok(None);
        }
        let engine = SmcEngine::new(config.strategy().clone())?;
        Ok(Some(
            Self::new(engine, source, journal)
                .symbol(config.broker.symbol.clone())
                .execution_enabled(config.execution.enabled),
        ))
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn bias_candles(mut self, count: usize) -> Self {
        self.bias_candles = count;
        self
    }

    pub fn execution_enabled(mut self, enabled: bool) -> Self {
        self.execution_enabled = enabled;
        self
    }

    pub fn engine(&self) -> &SmcEngine {
        &self.engine
    }

    pub fn journal(&self) -> &Arc<SignalJournal> {
        &self.journal
    }

    /// Fetch both series, analyze, and journal the result if it is a BUY or
    /// SELL.
    ///
    /// Returns `None` (and records nothing) when either series is unavailable
    /// or malformed. NONE results are returned but not recorded.
    pub fn tick(&self) -> Option<SignalResult> {
        let config = self.engine.config();
        let entry = self.source.fetch(
            &self.symbol,
            &config.entry_timeframe,
            config.min_candles.get(),
        );
        let bias = self
            .source
            .fetch(&self.symbol, &config.bias_timeframe, self.bias_candles);

        let (Some(entry), Some(bias)) = (entry, bias) else {
            info!(symbol = %self.symbol, "insufficient live data for analysis");
            return None;
        };
        if let Err(e) = validate_series(&entry).and_then(|_| validate_series(&bias)) {
            warn!(symbol = %self.symbol, error = %e, "malformed candles; skipping analysis");
            return None;
        }

        let signal = self.engine.analyze(&entry, &bias);
        info!(
            symbol = %self.symbol,
            signal = %signal.direction,
            strength = signal.strength,
            confluence_count = signal.details.confluence_count,
            reason = signal.reason().map(|r| r.as_str()),
            "analyze result"
        );

        if signal.is_signal() {
            if self.execution_enabled {
                info!(
                    signal = %signal.direction,
                    entry = signal.entry_price,
                    stop_loss = signal.stop_loss,
                    take_profit = signal.take_profit,
                    "valid signal detected"
                );
            }
            self.journal.record(signal.clone());
        }
        Some(signal)
    }
}

// ============================================================
// TESTS
// ============================================================
