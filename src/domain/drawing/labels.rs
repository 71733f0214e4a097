//! Text shown next to drawings.

/// Price with precision scaled to its magnitude.
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if magnitude >= 1.0 {
        format!("{price:.2}")
    } else if magnitude >= 0.01 {
        format!("{price:.4}")
    } else {
        format!("{price:.6}")
    }
}

/// `"61.8% - 161.80"`
pub fn fib_label(ratio: f64, price: f64) -> String {
    format!("{:.1}% - {}", ratio * 100.0, format_price(price))
}

/// Measurements shown by the ruler between two anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerMeasurement {
    pub price_delta: f64,
    /// `None` when the first anchor sits at price zero.
    pub percent_change: Option<f64>,
    pub bar_delta: usize,
}

impl RulerMeasurement {
    pub fn between(price1: f64, index1: usize, price2: f64, index2: usize) -> Self {
        Self {
            price_delta: (price2 - price1).abs(),
            percent_change: (price1 != 0.0).then(|| (price2 - price1) / price1 * 100.0),
            bar_delta: index1.abs_diff(index2),
        }
    }

    /// The three info-box lines, top to bottom.
    pub fn lines(&self) -> [String; 3] {
        let percent = match self.percent_change {
            Some(pct) => format!("{pct:.2}%"),
            None => "n/a".to_string(),
        };
        [
            format!("Δ Price: {}", format_price(self.price_delta)),
            percent,
            format!("Δ Bars: {}", self.bar_delta),
        ]
    }
}
