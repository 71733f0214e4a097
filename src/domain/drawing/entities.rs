use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::chart::{ChartViewport, DomainPoint, PixelPoint};

use super::value_objects::{AnnotationStyle, DrawingTool};

/// Unique annotation identifier: creation time plus a per-session random
/// seed and counter, so several drawings created within one millisecond
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Hands out `AnnotationId`s for one session.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: u32,
    counter: u32,
}

impl IdGenerator {
    /// `seed` should be random per page load (the browser layer feeds
    /// `Math.random`); tests pass a constant.
    pub fn new(seed: u32) -> Self {
        Self { seed, counter: 0 }
    }

    pub fn next_id(&mut self, timestamp_ms: u64) -> AnnotationId {
        self.counter = self.counter.wrapping_add(1);
        AnnotationId(format!("{timestamp_ms}-{:08x}-{:x}", self.seed, self.counter))
    }
}

/// What an annotation is. Only text labels carry extra data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool")]
pub enum AnnotationKind {
    #[serde(rename = "hline")]
    HorizontalLine,
    #[serde(rename = "trendline")]
    TrendLine,
    #[serde(rename = "fib_ret")]
    FibRetracement,
    #[serde(rename = "fib_ext")]
    FibExtension,
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "ruler")]
    Ruler,
    #[serde(rename = "text")]
    TextLabel { text: String },
}

impl AnnotationKind {
    /// Fresh kind for a tool; text labels start with `placeholder`.
    pub fn for_tool(tool: DrawingTool, placeholder: &str) -> Self {
        match tool {
            DrawingTool::HorizontalLine => AnnotationKind::HorizontalLine,
            DrawingTool::TrendLine => AnnotationKind::TrendLine,
            DrawingTool::FibRetracement => AnnotationKind::FibRetracement,
            DrawingTool::FibExtension => AnnotationKind::FibExtension,
            DrawingTool::Rectangle => AnnotationKind::Rectangle,
            DrawingTool::Ruler => AnnotationKind::Ruler,
            DrawingTool::TextLabel => AnnotationKind::TextLabel { text: placeholder.to_string() },
        }
    }

    pub fn tool(&self) -> DrawingTool {
        match self {
            AnnotationKind::HorizontalLine => DrawingTool::HorizontalLine,
            AnnotationKind::TrendLine => DrawingTool::TrendLine,
            AnnotationKind::FibRetracement => DrawingTool::FibRetracement,
            AnnotationKind::FibExtension => DrawingTool::FibExtension,
            AnnotationKind::Rectangle => DrawingTool::Rectangle,
            AnnotationKind::Ruler => DrawingTool::Ruler,
            AnnotationKind::TextLabel { .. } => DrawingTool::TextLabel,
        }
    }
}

/// Domain entity - a committed annotation, anchored in chart coordinates
/// so it survives pan and zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(flatten)]
    pub kind: AnnotationKind,
    pub anchor1: DomainPoint,
    pub anchor2: DomainPoint,
    #[serde(flatten)]
    pub style: AnnotationStyle,
    pub created_at: u64,
}

impl Annotation {
    pub fn new(
        id: AnnotationId,
        kind: AnnotationKind,
        anchor1: DomainPoint,
        anchor2: DomainPoint,
        style: AnnotationStyle,
        created_at: u64,
    ) -> Self {
        Self { id, kind, anchor1, anchor2, style, created_at }
    }

    pub fn tool(&self) -> DrawingTool {
        self.kind.tool()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            AnnotationKind::TextLabel { text } => Some(text),
            _ => None,
        }
    }
}

/// An annotation under construction.
///
/// Its anchors are pixels in the frame the pointer events arrived in; they
/// become chart coordinates only when the drawing is committed, against the
/// viewport current at that moment.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlightAnnotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub anchor1: PixelPoint,
    pub anchor2: PixelPoint,
    pub style: AnnotationStyle,
    pub created_at: u64,
}

impl InFlightAnnotation {
    /// Both anchors start at the press position.
    pub fn start(
        id: AnnotationId,
        kind: AnnotationKind,
        at: PixelPoint,
        style: AnnotationStyle,
        created_at: u64,
    ) -> Self {
        Self { id, kind, anchor1: at, anchor2: at, style, created_at }
    }

    pub fn tool(&self) -> DrawingTool {
        self.kind.tool()
    }

    pub fn set_text(&mut self, value: String) {
        if let AnnotationKind::TextLabel { text } = &mut self.kind {
            *text = value;
        }
    }

    /// Chart-coordinate view of this drawing in `viewport`, used both for
    /// the live preview and for the commit.
    pub fn resolve(&self, viewport: &ChartViewport<'_>) -> Annotation {
        Annotation::new(
            self.id.clone(),
            self.kind.clone(),
            viewport.pixel_to_domain(self.anchor1),
            viewport.pixel_to_domain(self.anchor2),
            self.style,
            self.created_at,
        )
    }

    pub fn commit(self, viewport: &ChartViewport<'_>) -> Annotation {
        let anchor1 = viewport.pixel_to_domain(self.anchor1);
        let anchor2 = viewport.pixel_to_domain(self.anchor2);
        Annotation::new(self.id, self.kind, anchor1, anchor2, self.style, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Color;

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let mut ids = IdGenerator::new(0xdead_beef);
        let a = ids.next_id(1_700_000_000_000);
        let b = ids.next_id(1_700_000_000_000);
        assert_ne!(a, b);
        assert!(a.value().starts_with("1700000000000-deadbeef-"));
    }

    #[test]
    fn persisted_shape_is_flat_and_tagged() {
        let annotation = Annotation::new(
            AnnotationId::new("1-0-1"),
            AnnotationKind::TextLabel { text: "Breakout".to_string() },
            DomainPoint::new(101.5, 3, 180_000),
            DomainPoint::new(101.5, 3, 180_000),
            AnnotationStyle { color: Color::from_hex(0xff8c00), line_width: 2.0 },
            42,
        );

        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["tool"], "text");
        assert_eq!(json["text"], "Breakout");
        assert_eq!(json["color"], "#ff8c00");
        assert_eq!(json["lineWidth"], 2.0);
        assert_eq!(json["anchor1"]["candleIndex"], 3);
        assert_eq!(json["createdAt"], 42);

        let back: Annotation = serde_json::from_value(json).unwrap();
        assert_eq!(back, annotation);
    }
}
