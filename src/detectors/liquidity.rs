//! Liquidity Sweep detector

#![allow(clippy::default_constructed_unit_structs)]

use super::helpers::last_two;
use crate::{Detection, Direction, PatternId, SmcDetector, OHLCV};

impl_with_defaults!(LiquiditySweepDetector);

/// Liquidity Sweep - wick runs past the previous extreme, close settles back inside.
///
/// Bullish: `high > prev.high` and `close < prev.high`.
/// Bearish: `low < prev.low` and `close > prev.low`.
#[derive(Debug, Clone, Default)]
pub struct LiquiditySweepDetector;

impl SmcDetector for LiquiditySweepDetector {
    fn id(&self) -> PatternId {
        PatternId("LIQUIDITY_SWEEP")
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T]) -> Option<Detection> {
        if bars.len() < self.min_bars() {
            return None;
        }
        let (prev, curr) = last_two(bars)?;

        let direction = if curr.high() > prev.high() && curr.close() < prev.high() {
            Direction::Bullish
        } else if curr.low() < prev.low() && curr.close() > prev.low() {
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
