use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::domain::chart::Color;
use crate::domain::market_data::{Symbol, TimeInterval};

/// Value Object - the seven drawing tools.
///
/// String forms (`hline`, `fib_ret`, ...) are what the toolbar buttons and
/// the persisted drawings use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
pub enum DrawingTool {
    #[strum(serialize = "hline")]
    #[serde(rename = "hline")]
    HorizontalLine,
    #[strum(serialize = "trendline")]
    #[serde(rename = "trendline")]
    TrendLine,
    #[strum(serialize = "fib_ret")]
    #[serde(rename = "fib_ret")]
    FibRetracement,
    #[strum(serialize = "fib_ext")]
    #[serde(rename = "fib_ext")]
    FibExtension,
    #[strum(serialize = "rectangle")]
    #[serde(rename = "rectangle")]
    Rectangle,
    #[strum(serialize = "ruler")]
    #[serde(rename = "ruler")]
    Ruler,
    #[strum(serialize = "text")]
    #[serde(rename = "text")]
    TextLabel,
}

impl DrawingTool {
    /// Button caption.
    pub fn label(&self) -> &'static str {
        match self {
            DrawingTool::HorizontalLine => "H-Line",
            DrawingTool::TrendLine => "Trend",
            DrawingTool::FibRetracement => "Fib Ret",
            DrawingTool::FibExtension => "Fib Ext",
            DrawingTool::Rectangle => "Rect",
            DrawingTool::Ruler => "Ruler",
            DrawingTool::TextLabel => "Text",
        }
    }

    pub fn all() -> Vec<DrawingTool> {
        DrawingTool::iter().collect()
    }
}

/// Value Object - instrument/timeframe pair selecting one annotation list.
///
/// Serialized as `"{symbol}_{interval}"`, e.g. `"BTCUSDT_1h"`, which is
/// also the map key in persisted storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{}_{}", symbol, interval)]
#[serde(into = "String", try_from = "String")]
pub struct ChartKey {
    pub symbol: Symbol,
    pub interval: TimeInterval,
}

impl ChartKey {
    pub fn new(symbol: Symbol, interval: TimeInterval) -> Self {
        Self { symbol, interval }
    }
}

impl From<ChartKey> for String {
    fn from(key: ChartKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for ChartKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ChartKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (symbol, interval) = value
            .rsplit_once('_')
            .ok_or_else(|| format!("chart key `{value}` has no `_` separator"))?;
        let interval = TimeInterval::from_str(interval)
            .map_err(|_| format!("chart key `{value}` has unknown timeframe `{interval}`"))?;
        Ok(Self::new(Symbol::new(symbol.to_string())?, interval))
    }
}

/// Value Object - stroke color and width of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    pub color: Color,
    pub line_width: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self { color: Color::from_hex(DEFAULT_DRAWING_COLOR), line_width: DEFAULT_LINE_WIDTH }
    }
}

/// Orange used for committed drawings.
pub const DEFAULT_DRAWING_COLOR: u32 = 0xff8c00;
/// Yellow used for the drawing under construction.
pub const HIGHLIGHT_DRAWING_COLOR: u32 = 0xffcc00;
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_key_string_form() {
        let key = ChartKey::new(Symbol::from("btcusdt"), TimeInterval::OneHour);
        assert_eq!(key.to_string(), "BTCUSDT_1h");
        assert_eq!("BTCUSDT_1h".parse::<ChartKey>(), Ok(key));
        // the symbol itself may contain underscores
        let odd: ChartKey = "PERP_ETH_15m".parse().unwrap();
        assert_eq!(odd.symbol.value(), "PERP_ETH");
        assert!("BTCUSDT".parse::<ChartKey>().is_err());
        assert!("BTCUSDT_7x".parse::<ChartKey>().is_err());
    }

    #[test]
    fn tool_names_match_toolbar_ids() {
        assert_eq!(DrawingTool::FibRetracement.as_ref(), "fib_ret");
        assert_eq!("text".parse::<DrawingTool>(), Ok(DrawingTool::TextLabel));
        assert_eq!(DrawingTool::all().len(), 7);
    }
}
