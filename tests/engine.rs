//! Integration tests for the SMC signal engine.
//!
//! Scenario bars are built with a caller-side bar type to exercise the
//! `OHLCV` trait the way downstream users plug in their own data.

use smc_signal::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> Option<f64> {
        Some(1_000_000.0)
    }
}

/// 100 ascending M5 bars: open 16000+2i, high 16020+2i, low 15980+2i, close 16010+2i
fn ascending_entry() -> Vec<TestBar> {
    (0..100)
        .map(|i| {
            let step = i as f64 * 2.0;
            TestBar::new(16000.0 + step, 16020.0 + step, 15980.0 + step, 16010.0 + step)
        })
        .collect()
}

/// 20 ascending H1 bars: close 16020+10i
fn ascending_bias() -> Vec<TestBar> {
    (0..20)
        .map(|i| {
            let step = i as f64 * 10.0;
            TestBar::new(16000.0 + step, 16050.0 + step, 15950.0 + step, 16020.0 + step)
        })
        .collect()
}

/// 20 descending H1 bars
fn descending_bias() -> Vec<TestBar> {
    (0..20)
        .map(|i| {
            let step = i as f64 * 10.0;
            TestBar::new(16200.0 - step, 16250.0 - step, 16150.0 - step, 16180.0 - step)
        })
        .collect()
}

fn flat(n: usize, price: f64) -> Vec<TestBar> {
    vec![TestBar::new(price, price, price, price); n]
}

fn default_engine() -> SmcEngine {
    EngineBuilder::new().build().unwrap()
}

// ============================================================
// SCENARIOS
// ============================================================

#[test]
fn test_ascending_series_buys() {
    let entry = ascending_entry();
    let bias = ascending_bias();
    let signal = default_engine().analyze(&entry, &bias);

    assert_eq!(signal.direction, SignalDirection::Buy);
    // BOS + MSS + liquidity sweep on the tail
    assert!(signal.details.bos);
    assert!(signal.details.mss);
    assert!(signal.details.liquidity_sweep);
    assert!(!signal.details.order_block);
    assert!(!signal.details.fvg);
    assert_eq!(signal.details.confluence_count, 3);
    assert_eq!(signal.strength, 80);

    let entry_price = signal.entry_price.unwrap();
    let stop_loss = signal.stop_loss.unwrap();
    assert_eq!(entry_price, 16208.0);
    // No order block: stop falls back to the latest low
    assert_eq!(stop_loss, 16178.0);
    assert_eq!(signal.stop_distance, Some(30.0));
    assert_eq!(signal.take_profit, Some(16298.0));

    let expected_tp = entry_price + (entry_price - stop_loss) * signal.risk_reward_ratio;
    assert!((signal.take_profit.unwrap() - expected_tp).abs() < 1e-9);
}

#[test]
fn test_bias_details_reported() {
    let signal = default_engine().analyze(&ascending_entry(), &ascending_bias());
    // 20 bars < period 50: EMA is the mean close
    let ema = signal.details.ema_value.unwrap();
    assert!((ema - 16115.0).abs() < 1e-9);
    assert_eq!(signal.details.ema_bias, Some(Direction::Bullish));
    assert_eq!(signal.details.bias_tf.as_deref(), Some("H1"));
}

#[test]
fn test_flat_series_has_no_entry() {
    let signal = default_engine().analyze(&flat(100, 16000.0), &ascending_bias());
    assert_eq!(signal.direction, SignalDirection::None);
    assert_eq!(signal.reason(), Some(NoSignalReason::NoEntryConditions));
    assert_eq!(signal.strength, 0);
}

#[test]
fn test_bullish_pattern_bearish_bias_is_misaligned() {
    let signal = default_engine().analyze(&ascending_entry(), &descending_bias());
    assert_eq!(signal.direction, SignalDirection::None);
    assert_eq!(signal.reason(), Some(NoSignalReason::Misaligned));
}

#[test]
fn test_bias_on_ema_is_neutral() {
    let signal = default_engine().analyze(&ascending_entry(), &flat(20, 16000.0));
    assert_eq!(signal.reason(), Some(NoSignalReason::NoBias));
}

#[test]
fn test_short_entry_is_insufficient() {
    let entry = ascending_entry();
    let signal = default_engine().analyze(&entry[..99], &ascending_bias());
    assert_eq!(signal.reason(), Some(NoSignalReason::InsufficientData));
    assert!(signal.entry_price.is_none());
}

#[test]
fn test_single_bias_bar_is_insufficient() {
    let bias = ascending_bias();
    let signal = default_engine().analyze(&ascending_entry(), &bias[..1]);
    assert_eq!(signal.reason(), Some(NoSignalReason::InsufficientData));
}

#[test]
fn test_bearish_mirror_sells() {
    let entry: Vec<TestBar> = ascending_entry()
        .iter()
        .map(|b| TestBar::new(-b.o + 40000.0, -b.l + 40000.0, -b.h + 40000.0, -b.c + 40000.0))
        .collect();
    let signal = default_engine().analyze(&entry, &descending_bias());

    assert_eq!(signal.direction, SignalDirection::Sell);
    let entry_price = signal.entry_price.unwrap();
    let stop_loss = signal.stop_loss.unwrap();
    assert!(stop_loss > entry_price);
    let expected_tp = entry_price - (stop_loss - entry_price) * signal.risk_reward_ratio;
    assert!((signal.take_profit.unwrap() - expected_tp).abs() < 1e-9);
}

#[test]
fn test_buy_with_bearish_order_block_uses_latest_low() {
    let mut entry = flat(97, 100.0);
    entry.extend([
        TestBar::new(100.0, 101.0, 98.0, 100.0),
        TestBar::new(103.0, 103.5, 98.5, 101.0), // bearish
        TestBar::new(101.0, 104.0, 99.0, 102.0), // closes back above it
    ]);
    let signal = default_engine().analyze(&entry, &ascending_bias());

    assert_eq!(signal.direction, SignalDirection::Buy);
    assert!(signal.details.order_block);
    assert_eq!(signal.details.confluence_count, 4);
    assert_eq!(signal.strength, 95);
    assert_eq!(signal.stop_loss, Some(99.0));
    assert_eq!(signal.take_profit, Some(102.0 + 3.0 * 3.0));
}

#[test]
fn test_order_block_without_mss_is_no_entry() {
    // Last bar dips under a bullish candle while printing a higher high:
    // BOS and a bullish order block fire, closes stop rising.
    let mut entry = ascending_entry();
    let n = entry.len();
    entry[n - 1] = TestBar::new(16206.0, 16230.0, 16190.0, 16200.0);
    let signal = default_engine().analyze(&entry, &ascending_bias());
    assert_eq!(signal.reason(), Some(NoSignalReason::NoEntryConditions));
    assert_eq!(signal.details.confluence_count, 0);
}

#[test]
fn test_idempotent() {
    let engine = default_engine();
    let entry = ascending_entry();
    let bias = ascending_bias();
    assert_eq!(engine.analyze(&entry, &bias), engine.analyze(&entry, &bias));
}

#[test]
fn test_tp_multiplier_is_ignored() {
    let config = StrategyConfig {
        tp_multiplier: 10.0,
        ..StrategyConfig::default()
    };
    let engine = EngineBuilder::new().config(config).build().unwrap();
    let baseline = default_engine().analyze(&ascending_entry(), &ascending_bias());
    assert_eq!(engine.analyze(&ascending_entry(), &ascending_bias()), baseline);
}

#[test]
fn test_custom_rr() {
    let engine = EngineBuilder::new().risk_reward(2.0).build().unwrap();
    let signal = engine.analyze(&ascending_entry(), &ascending_bias());
    assert_eq!(signal.take_profit, Some(16208.0 + 30.0 * 2.0));
    assert_eq!(signal.risk_reward_ratio, 2.0);
}

#[test]
fn test_json_output_for_dashboard() {
    let signal = default_engine().analyze(&ascending_entry(), &ascending_bias());
    let v = serde_json::to_value(&signal).unwrap();
    assert_eq!(v["signal"], "BUY");
    assert_eq!(v["strength"], 80);
    assert_eq!(v["sl_distance"], 30.0);
    assert_eq!(v["details"]["ema_bias"], "bullish");
    assert_eq!(v["details"]["liquidity_sweep"], true);
    assert_eq!(v["details"]["entry_tf"], "M5");
    assert!(v["details"].get("reason").is_none());
}

// ============================================================
// DETECTOR API
// ============================================================

#[test]
fn test_confluence_on_custom_bars() {
    let r = ConfluenceResult::evaluate(&ascending_entry());
    assert!(r.is_valid());
    assert_eq!(r.pattern_type, Some(Direction::Bullish));
    assert_eq!(r.support, Some(16178.0));
    assert_eq!(r.resistance, Some(16218.0));
}

#[test]
fn test_detectors_on_dyn_bars() {
    let bars = ascending_entry();
    let dyn_bars: Vec<&dyn OHLCV> = bars.iter().map(|b| b as &dyn OHLCV).collect();
    let found: Vec<_> = BuiltinDetector::all()
        .iter()
        .filter_map(|d| d.detect(&dyn_bars))
        .map(|m| m.pattern_id.as_str())
        .collect();
    assert_eq!(found, ["BOS", "MSS", "LIQUIDITY_SWEEP"]);
}

#[test]
fn test_detectors_by_type() {
    let bars = ascending_entry();
    assert!(BreakOfStructureDetector::with_defaults().detect(&bars).is_some());
    assert!(MarketStructureShiftDetector::with_defaults().detect(&bars).is_some());
    assert!(OrderBlockDetector::with_defaults().detect(&bars).is_none());
    assert!(FairValueGapDetector::with_defaults().detect(&bars).is_none());
    assert!(LiquiditySweepDetector::with_defaults().detect(&bars).is_some());
    assert!(validate_series(&bars).is_ok());
}

#[test]
fn test_detectors_tolerate_empty_input() {
    let bars: Vec<TestBar> = Vec::new();
    for detector in BuiltinDetector::all() {
        assert!(detector.detect(&bars).is_none(), "{}", detector.id().as_str());
    }
    let signal = default_engine().analyze(&bars, &bars);
    assert_eq!(signal.reason(), Some(NoSignalReason::InsufficientData));
}

// ============================================================
// PARALLEL / JOURNAL
// ============================================================

#[test]
fn test_parallel_analysis() {
    let engine = default_engine();
    let entry = ascending_entry();
    let up = ascending_bias();
    let down = descending_bias();

    let instruments: Vec<(&str, &[TestBar], &[TestBar])> =
        vec![("US30", &entry, &up), ("US30-inv", &entry, &down)];
    let results = analyze_parallel(&engine, instruments);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].signal.direction, SignalDirection::Buy);
    assert_eq!(results[1].signal.reason(), Some(NoSignalReason::Misaligned));
}

#[test]
fn test_status_reports_journal() {
    let engine = default_engine();
    let journal = SignalJournal::new();
    journal.record(engine.analyze(&ascending_entry(), &ascending_bias()));
    journal.record(engine.analyze(&flat(100, 1.0), &ascending_bias()));

    let status = engine.status(&journal);
    assert_eq!(status.total_signals, 2);
    assert_eq!(
        status.last_signal.and_then(|s| s.reason()),
        Some(NoSignalReason::NoEntryConditions)
    );
    let v = serde_json::to_value(engine.status(&journal)).unwrap();
    assert_eq!(v["strategy"], "SMC");
    assert_eq!(v["entry_timeframe"], "M5");
}
