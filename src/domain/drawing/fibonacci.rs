use crate::domain::chart::Color;

/// Retracement ratios, drawn between the two anchors.
pub const RETRACEMENT_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];
pub const RETRACEMENT_PALETTE: [u32; 7] =
    [0xf44336, 0xff9800, 0xffeb3b, 0x8bc34a, 0x4caf50, 0x03a9f4, 0x9c27b0];

/// Extension ratios, drawn across the full chart width.
pub const EXTENSION_RATIOS: [f64; 9] = [0.0, 0.236, 0.382, 0.5, 0.618, 1.0, 1.272, 1.618, 2.618];
pub const EXTENSION_PALETTE: [u32; 9] = [
    0xf44336, 0xff5722, 0xff9800, 0xffc107, 0x8bc34a, 0x4caf50, 0x009688, 0x00bcd4, 0x2196f3,
];

/// Which level table to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FibonacciSet {
    Retracement,
    Extension,
}

/// One computed level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
    pub color: Color,
}

impl FibonacciSet {
    pub fn ratios(&self) -> &'static [f64] {
        match self {
            FibonacciSet::Retracement => &RETRACEMENT_RATIOS,
            FibonacciSet::Extension => &EXTENSION_RATIOS,
        }
    }

    fn palette(&self) -> &'static [u32] {
        match self {
            FibonacciSet::Retracement => &RETRACEMENT_PALETTE,
            FibonacciSet::Extension => &EXTENSION_PALETTE,
        }
    }

    /// Levels measured from `price1` (ratio 0) towards `price2` (ratio 1).
    pub fn levels(&self, price1: f64, price2: f64) -> Vec<FibLevel> {
        self.ratios()
            .iter()
            .zip(self.palette())
            .map(|(&ratio, &color)| FibLevel {
                ratio,
                price: level_value(price1, price2, ratio),
                color: Color::from_hex(color),
            })
            .collect()
    }
}

/// Linear interpolation used for both level prices and level pixels.
pub fn level_value(from: f64, to: f64, ratio: f64) -> f64 {
    from + (to - from) * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_level_sits_halfway() {
        let levels = FibonacciSet::Retracement.levels(100.0, 200.0);
        assert_eq!(levels.len(), 7);
        assert_eq!(levels[3].ratio, 0.5);
        assert_eq!(levels[3].price, 150.0);
        assert_eq!(levels[0].price, 100.0);
        assert_eq!(levels[6].price, 200.0);
    }

    #[test]
    fn extension_reaches_past_the_second_anchor() {
        let levels = FibonacciSet::Extension.levels(100.0, 200.0);
        assert_eq!(levels.len(), 9);
        assert!((levels[8].price - 361.8).abs() < 1e-9);
        assert_eq!(levels[8].color.to_hex(), 0x2196f3);
    }
}
