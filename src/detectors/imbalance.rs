//! Imbalance detectors: Order Block and Fair Value Gap
//!
//! Both report a price level alongside the direction. The order block level
//! becomes the stop reference downstream; the gap midpoint is informational.

#![allow(clippy::default_constructed_unit_structs)]

use super::helpers::{last_three, last_two};
use crate::{Detection, Direction, OHLCVExt, PatternId, SmcDetector, OHLCV};

impl_with_defaults!(OrderBlockDetector, FairValueGapDetector);

// ============================================================
// ORDER BLOCK
// ============================================================

/// Order Block - price returns into the previous candle.
///
/// Bullish: previous candle bullish and the current close falls back below
/// its close; support = previous low.
/// Bearish: previous candle bearish and the current close rises back above
/// its close; resistance = previous high.
#[derive(Debug, Clone, Default)]
pub struct OrderBlockDetector;

impl SmcDetector for OrderBlockDetector {
    fn id(&self) -> PatternId {
        PatternId("ORDER_BLOCK")
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (prev, curr) = last_two(bars)?;

        let (direction, level) = if prev.is_bullish() && curr.close() < prev.close() {
            (Direction::Bullish, prev.low())
        } else if prev.is_bearish() && curr.close() > prev.close() {
            (Direction::Bearish, prev.high())
        } else {
            return None;
        };

        Some(Detection {
            pattern_id: SmcDetector::id(self),
            direction,
            level: Some(level),
        })
    }
}

// ============================================================
// FAIR VALUE GAP
// ============================================================

/// Fair Value Gap - three-candle imbalance.
///
/// With c1, c2, c3 the three latest candles (c3 newest):
/// bullish when `c1.high < c2.close` and `c2.open < c3.low`,
/// bearish when `c1.low > c2.close` and `c2.open > c3.high`.
/// The level is the midpoint of c1's extreme and c2's open.
#[derive(Debug, Clone, Default)]
pub struct FairValueGapDetector;

impl SmcDetector for FairValueGapDetector {
    fn id(&self) -> PatternId {
        PatternId("FVG")
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (c1, c2, c3) = last_three(bars)?;

        let (direction, level) = if c1.high() < c2.close() && c2.open() < c3.low() {
            (Direction::Bullish, (c1.high() + c2.open()) / 2.0)
        } else if c1.low() > c2.close() && c2.open() > c3.high() {
            (Direction::Bearish, (c1.low() + c2.open()) / 2.0)
        } else {
            return None;
        };

        Some(Detection {
            pattern_id: SmcDetector::id(self),
            direction,
            level: Some(level),
        })
    }
}
