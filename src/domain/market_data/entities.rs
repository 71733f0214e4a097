pub use super::value_objects::{OHLCV, Price, Timestamp, Volume};
use serde::{Deserialize, Serialize};

/// Domain entity - Candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    pub ohlcv: OHLCV,
}

impl Candle {
    pub fn new(timestamp: Timestamp, ohlcv: OHLCV) -> Self {
        Self { timestamp, ohlcv }
    }

    /// Candle with only the fields the drawing layer reads; open/close are
    /// set to the midpoint and volume to zero.
    pub fn from_range(timestamp: u64, high: f64, low: f64) -> Self {
        let mid = (high + low) / 2.0;
        Self::new(
            Timestamp::from_millis(timestamp),
            OHLCV::new(
                Price::from(mid),
                Price::from(high),
                Price::from(low),
                Price::from(mid),
                Volume::default(),
            ),
        )
    }

    pub fn high(&self) -> f64 {
        self.ohlcv.high.value()
    }

    pub fn low(&self) -> f64 {
        self.ohlcv.low.value()
    }
}

/// Lowest low and highest high over a slice, `None` when empty.
pub fn price_range(candles: &[Candle]) -> Option<(f64, f64)> {
    if candles.is_empty() {
        return None;
    }

    let (min, max) = candles.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.low()), hi.max(c.high()))
    });
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_range_spans_lows_and_highs() {
        let candles = vec![
            Candle::from_range(0, 110.0, 95.0),
            Candle::from_range(60_000, 115.0, 100.0),
        ];
        assert_eq!(price_range(&candles), Some((95.0, 115.0)));
        assert_eq!(price_range(&[]), None);
    }
}
