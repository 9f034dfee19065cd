//! Tail accessors shared by the detector modules.

/// Bar `n` positions from the end: `back(bars, 1)` is the latest bar.
///
/// Returns `None` when `n` is zero or exceeds the series length.
#[inline]
pub fn back<T>(bars: &[T], n: usize) -> Option<&T> {
    if n == 0 {
        return None;
    }
    bars.len().checked_sub(n).and_then(|i| bars.get(i))
}

/// Latest two bars as `(previous, current)`.
#[inline]
pub fn last_two<T>(bars: &[T]) -> Option<(&T, &T)> {
    Some((back(bars, 2)?, back(bars, 1)?))
}

/// Latest three bars, oldest first.
#[inline]
pub fn last_three<T>(bars: &[T]) -> Option<(&T, &T, &T)> {
    Some((back(bars, 3)?, back(bars, 2)?, back(bars, 1)?))
}

/// Strictly increasing (`Some(Bullish)`) or strictly decreasing
/// (`Some(Bearish)`) run of three values, oldest first.
#[inline]
pub fn monotonic_three(first: f64, second: f64, third: f64) -> Option<crate::Direction> {
    if third > second && second > first {
        Some(crate::Direction::Bullish)
    } else if third < second && second < first {
        Some(crate::Direction::Bearish)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn test_back() {
        let v = [1, 2, 3];
        assert_eq!(back(&v, 1), Some(&3));
        assert_eq!(back(&v, 3), Some(&1));
        assert_eq!(back(&v, 4), None);
        assert_eq!(back(&v, 0), None);
        assert_eq!(back::<i32>(&[], 1), None);
    }

    #[test]
    fn test_last_two_and_three() {
        let v = [1, 2, 3, 4];
        assert_eq!(last_two(&v), Some((&3, &4)));
        assert_eq!(last_three(&v), Some((&2, &3, &4)));
        assert_eq!(last_three(&v[..2]), None);
    }

    #[test]
    fn test_monotonic_three() {
        assert_eq!(monotonic_three(1.0, 2.0, 3.0), Some(Direction::Bullish));
        assert_eq!(monotonic_three(3.0, 2.0, 1.0), Some(Direction::Bearish));
        assert_eq!(monotonic_three(1.0, 1.0, 2.0), None);
        assert_eq!(monotonic_three(1.0, 3.0, 2.0), None);
        assert_eq!(monotonic_three(f64::NAN, 1.0, 2.0), None);
    }
}
