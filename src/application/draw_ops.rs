use serde::Serialize;

use crate::domain::chart::{Color, PixelPoint, PixelRect};

pub const LABEL_FONT: &str = "12px JetBrains Mono";
pub const FIB_FONT: &str = "9px JetBrains Mono";
pub const RULER_FONT: &str = "10px JetBrains Mono";
pub const TEXT_LABEL_FONT: &str = "600 14px JetBrains Mono";

/// Line dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LineDash {
    Solid,
    /// `(dash, gap)` in pixels.
    Dashed(f64, f64),
}

impl LineDash {
    pub fn segments(&self) -> Vec<f64> {
        match self {
            LineDash::Solid => Vec::new(),
            LineDash::Dashed(dash, gap) => vec![*dash, *gap],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub dash: LineDash,
    /// Global alpha applied on top of the color's own alpha.
    pub opacity: f64,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: LineDash::Solid, opacity: 1.0 }
    }

    pub fn dashed(self, dash: f64, gap: f64) -> Self {
        Self { dash: LineDash::Dashed(dash, gap), ..self }
    }

    pub fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
}

impl TextAlign {
    pub fn as_css(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextBaseline {
    Alphabetic,
    Top,
}

impl TextBaseline {
    pub fn as_css(&self) -> &'static str {
        match self {
            TextBaseline::Alphabetic => "alphabetic",
            TextBaseline::Top => "top",
        }
    }
}

/// One self-contained canvas instruction. The renderer produces these; a
/// backend replays them on a 2D context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Line { from: PixelPoint, to: PixelPoint, stroke: StrokeStyle },
    StrokeRect { rect: PixelRect, stroke: StrokeStyle },
    FillRect { rect: PixelRect, color: Color },
    FillCircle { center: PixelPoint, radius: f64, color: Color },
    Text {
        text: String,
        at: PixelPoint,
        font: &'static str,
        color: Color,
        align: TextAlign,
        baseline: TextBaseline,
    },
}

impl DrawOp {
    pub fn text(text: impl Into<String>, at: PixelPoint, font: &'static str, color: Color) -> Self {
        DrawOp::Text {
            text: text.into(),
            at,
            font,
            color,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Text width oracle. Canvas measurement needs a live context, so the
/// renderer asks through this trait.
pub trait TextMeasurer {
    fn text_width(&self, text: &str, font: &'static str) -> f64;
}

/// Monospace approximation: every glyph is `char_width` wide.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasurer {
    pub char_width: f64,
}

impl FixedWidthMeasurer {
    /// JetBrains Mono advance at 14px.
    pub const MONO_14PX: Self = Self { char_width: 8.4 };
}

impl Default for FixedWidthMeasurer {
    fn default() -> Self {
        Self::MONO_14PX
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn text_width(&self, text: &str, _font: &'static str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}
