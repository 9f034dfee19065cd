//! Structure detectors: Break of Structure (BOS) and Market Structure Shift (MSS)

#![allow(clippy::default_constructed_unit_structs)]

use super::helpers::{last_three, monotonic_three};
use crate::{Detection, Direction, PatternId, SmcDetector, OHLCV};

impl_with_defaults!(BreakOfStructureDetector, MarketStructureShiftDetector);

// ============================================================
// BREAK OF STRUCTURE
// ============================================================

/// BOS - latest bar breaks two consecutively rising highs (bullish)
/// or two consecutively falling lows (bearish).
#[derive(Debug, Clone, Default)]
pub struct BreakOfStructureDetector;

impl SmcDetector for BreakOfStructureDetector {
    fn id(&self) -> PatternId {
        PatternId("BOS")
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (two_back, prev, curr) = last_three(bars)?;

        let direction = if curr.high() > prev.high() && prev.high() > two_back.high() {
            Direction::Bullish
        } else if curr.low() < prev.low() && prev.low() < two_back.low() {
            Direction::Bearish
        } else {
            return None;
        };

        Some(Detection {
            pattern_id: SmcDetector::id(self),
            direction,
            level: None,
        })
    }
}

// ============================================================
// MARKET STRUCTURE SHIFT
// ============================================================

/// MSS - three strictly increasing (bullish) or decreasing (bearish) closes.
#[derive(Debug, Clone, Default)]
pub struct MarketStructureShiftDetector;

impl SmcDetector for MarketStructureShiftDetector {
    fn id(&self) -> PatternId {
        PatternId("MSS")
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (two_back, prev, curr) = last_three(bars)?;
        let direction = monotonic_three(two_back.close(), prev.close(), curr.close())?;

        Some(Detection {
            pattern_id: SmcDetector::id(self),
            direction,
            level: None,
        })
    }
}
