//! Confluence aggregation over the five builtin detectors

use tracing::debug;

use crate::{detectors::helpers::back, BuiltinDetector, Detection, Direction, OHLCV};

/// Aggregate of one pass of every detector over the entry series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfluenceResult {
    pub bos: bool,
    pub mss: bool,
    pub order_block: bool,
    pub fvg: bool,
    pub liquidity_sweep: bool,
    /// Number of flags set (0..=5), regardless of direction
    pub confluence_count: u8,
    /// Direction of the BOS detection; the other detectors only add to the count
    pub pattern_type: Option<Direction>,
    /// Stop reference for longs, set only on a valid setup: the bullish
    /// order block low, else the latest low
    pub support: Option<f64>,
    /// Stop reference for shorts, set only on a valid setup: the bearish
    /// order block high, else the latest high
    pub resistance: Option<f64>,
    /// Midpoint of the detected fair value gap
    pub fvg_level: Option<f64>,
}

impl ConfluenceResult {
    /// Run every builtin detector (no short-circuit) and combine the outcomes.
    pub fn evaluate<T: OHLCV>(bars: &[T]) -> Self {
        Self::evaluate_with(&BuiltinDetector::all(), bars)
    }

    /// Same as [`ConfluenceResult::evaluate`] over an explicit detector set.
    pub fn evaluate_with<T: OHLCV>(detectors: &[BuiltinDetector], bars: &[T]) -> Self {
        let mut result = Self::default();
        let mut order_block: Option<Detection> = None;

        for detector in detectors {
            let Some(found) = detector.detect(bars) else {
                continue;
            };

            match detector {
                BuiltinDetector::BreakOfStructure(_) => {
                    result.bos = true;
                    result.pattern_type = Some(found.direction);
                }
                BuiltinDetector::MarketStructureShift(_) => result.mss = true,
                BuiltinDetector::OrderBlock(_) => {
                    result.order_block = true;
                    order_block = Some(found);
                }
                BuiltinDetector::FairValueGap(_) => {
                    result.fvg = true;
                    result.fvg_level = found.level;
                }
                BuiltinDetector::LiquiditySweep(_) => result.liquidity_sweep = true,
            }
        }

        result.confluence_count = result.flags().iter().filter(|&&set| set).count() as u8;

        if result.is_valid() {
            let latest = back(bars, 1);
            let (ob_support, ob_resistance) = match order_block {
                Some(ob) if ob.direction.is_bullish() => (ob.level, None),
                Some(ob) => (None, ob.level),
                None => (None, None),
            };
            result.support = ob_support.or_else(|| latest.map(|b| b.low()));
            result.resistance = ob_resistance.or_else(|| latest.map(|b| b.high()));
        }

        debug!(
            bos = result.bos,
            mss = result.mss,
            order_block = result.order_block,
            fvg = result.fvg,
            liquidity_sweep = result.liquidity_sweep,
            confluence_count = result.confluence_count,
            valid = result.is_valid(),
            "confluence evaluated"
        );

        result
    }

    /// Detector flags in evaluation order: BOS, MSS, OB, FVG, LS.
    #[inline]
    pub fn flags(&self) -> [bool; 5] {
        [
            self.bos,
            self.mss,
            self.order_block,
            self.fvg,
            self.liquidity_sweep,
        ]
    }

    /// BOS and MSS both present
    #[inline]
    pub fn has_core_signals(&self) -> bool {
        self.bos && self.mss
    }

    /// At least one of order block, fair value gap or liquidity sweep
    #[inline]
    pub fn has_confluence(&self) -> bool {
        self.order_block || self.fvg || self.liquidity_sweep
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.has_core_signals() && self.has_confluence()
    }
}
