//! Higher-timeframe EMA bias filter

use crate::{Direction, Period, OHLCV};

/// EMA bias evaluated at the latest bar of the bias series.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BiasReading {
    pub ema: f64,
    pub close: f64,
    /// `None` when the latest close sits exactly on the EMA
    pub direction: Option<Direction>,
}

/// Latest EMA value of `closes`.
///
/// A series shorter than `period` returns its plain mean. Otherwise the
/// recurrence `ema += alpha * (close - ema)` with
/// `alpha = 2 / (period + 1)` runs from the first close, which seeds it.
/// Returns `None` only for an empty series.
pub fn ema_last<I>(closes: I, period: Period) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: ExactSizeIterator,
{
    let mut iter = closes.into_iter();
    let len = iter.len();
    if len == 0 {
        return None;
    }

    if len < period.get() {
        let sum: f64 = iter.sum();
        return Some(sum / len as f64);
    }

    let alpha = 2.0 / (period.get() as f64 + 1.0);
    let seed = iter.next()?;
    Some(iter.fold(seed, |ema, close| ema + alpha * (close - ema)))
}

/// Classify the bias series against its EMA.
///
/// Returns `None` for an empty series.
pub fn ema_bias<T: OHLCV>(bars: &[T], period: Period) -> Option<BiasReading> {
    let close = bars.last()?.close();
    let ema = ema_last(bars.iter().map(|b| b.close()), period)?;

    let direction = if close > ema {
        Some(Direction::Bullish)
    } else if close < ema {
        Some(Direction::Bearish)
    } else {
        None
    };

    Some(BiasReading {
        ema,
        close,
        direction,
    })
}
