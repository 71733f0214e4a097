use serde::{Deserialize, Serialize};

/// Value Object - zoom and pan as the chart engine reports them.
///
/// `zoom_x` divides the number of visible candles, `zoom_y` divides the
/// visible price span, `pan_x` shifts the window back in time by whole
/// candles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub zoom_x: f64,
    pub zoom_y: f64,
    pub pan_x: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { zoom_x: 1.0, zoom_y: 1.0, pan_x: 0.0 }
    }
}

impl ViewState {
    pub fn new(zoom_x: f64, zoom_y: f64, pan_x: f64) -> Self {
        Self { zoom_x, zoom_y, pan_x }
    }

    pub fn with_zoom_x(self, zoom_x: f64) -> Self {
        Self { zoom_x, ..self }
    }

    pub fn with_pan_x(self, pan_x: f64) -> Self {
        Self { pan_x, ..self }
    }

    /// Zoom factors must be finite and positive for a window to exist.
    pub fn is_valid(&self) -> bool {
        self.zoom_x.is_finite()
            && self.zoom_x > 0.0
            && self.zoom_y.is_finite()
            && self.zoom_y > 0.0
            && self.pan_x.is_finite()
    }
}

/// Value Object - chart body size in CSS pixels (axes included)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Value Object - space reserved for the price axis (right) and time axis (bottom)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartMargins {
    pub right: f64,
    pub bottom: f64,
}

impl Default for ChartMargins {
    fn default() -> Self {
        Self { right: 80.0, bottom: 30.0 }
    }
}

impl ChartMargins {
    /// Drawable width and height left once the axes are removed.
    pub fn plot_area(&self, canvas: CanvasSize) -> (f64, f64) {
        (canvas.width - self.right, canvas.height - self.bottom)
    }
}

/// Value Object - a position on the canvas, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Value Object - axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box of two corners in any order.
    pub fn spanning(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Square of side `size` centred on `center`.
    pub fn square(center: PixelPoint, size: f64) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    pub fn contains(&self, p: PixelPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Value Object - viewport-independent chart position.
///
/// `candle_index` is absolute within the series; `time` is that candle's
/// open time, kept for display and for re-anchoring if the series grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPoint {
    pub price: f64,
    pub candle_index: usize,
    pub time: u64,
}

impl DomainPoint {
    pub fn new(price: f64, candle_index: usize, time: u64) -> Self {
        Self { price, candle_index, time }
    }
}

/// Value Object - RGBA color, channels in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let r = channel_to_u8(self.r) as u32;
        let g = channel_to_u8(self.g) as u32;
        let b = channel_to_u8(self.b) as u32;
        (r << 16) | (g << 8) | b
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_css_hex(value: &str) -> Option<Self> {
        let digits = value.trim().strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            3 => {
                let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16).ok().map(Self::from_hex)
            }
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_hex),
            8 => {
                let rgb = u32::from_str_radix(&digits[..6], 16).ok()?;
                let a = u8::from_str_radix(&digits[6..], 16).ok()?;
                Some(Self::from_hex(rgb).with_alpha(a as f32 / 255.0))
            }
            _ => None,
        }
    }

    /// CSS form understood by the canvas: `#rrggbb` when opaque, `rgba()` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:06x}", self.to_hex())
        } else {
            format!(
                "rgba({},{},{},{})",
                channel_to_u8(self.r),
                channel_to_u8(self.g),
                channel_to_u8(self.b),
                (self.a * 1000.0).round() / 1000.0
            )
        }
    }

    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

// Persisted as the CSS hex string so stored drawings stay human-readable.
impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.a >= 1.0 {
            serializer.serialize_str(&format!("#{:06x}", self.to_hex()))
        } else {
            serializer.serialize_str(&format!(
                "#{:06x}{:02x}",
                self.to_hex(),
                channel_to_u8(self.a)
            ))
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse_css_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{raw}`")))
    }
}
