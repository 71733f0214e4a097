use crate::domain::chart::{ChartViewport, Color, PixelPoint, PixelRect};
use crate::domain::drawing::{
    Annotation, AnnotationKind, FibonacciSet, InFlightAnnotation, RulerMeasurement, fib_label,
    format_price, level_value,
};

use super::draw_ops::{
    DrawOp, FIB_FONT, LABEL_FONT, RULER_FONT, StrokeStyle, TEXT_LABEL_FONT, TextAlign,
    TextBaseline, TextMeasurer,
};

const HANDLE_SIZE: f64 = 6.0;
const FIB_HANDLE_SIZE: f64 = 8.0;
const RULER_HANDLE_RADIUS: f64 = 4.0;
const PRICE_TAG_WIDTH: f64 = 72.0;
const PRICE_TAG_HEIGHT: f64 = 16.0;
const RULER_BOX_WIDTH: f64 = 120.0;
const RULER_BOX_HEIGHT: f64 = 50.0;
const TEXT_BOX_HEIGHT: f64 = 18.0;
const FIB_EXT_LABEL_INSET: f64 = 120.0;
/// `0x80` alpha used for Fibonacci level lines.
const FIB_LINE_ALPHA: f32 = 128.0 / 255.0;
/// `0x10` alpha used for rectangle fills.
const RECT_FILL_ALPHA: f32 = 16.0 / 255.0;

/// Turns annotations into canvas instructions for one frame.
///
/// Stateless apart from the frame's viewport: the same annotation and the
/// same viewport always give the same ops.
pub struct AnnotationRenderer<'r, 'a> {
    viewport: &'r ChartViewport<'a>,
    measurer: &'r dyn TextMeasurer,
}

impl<'r, 'a> AnnotationRenderer<'r, 'a> {
    pub fn new(viewport: &'r ChartViewport<'a>, measurer: &'r dyn TextMeasurer) -> Self {
        Self { viewport, measurer }
    }

    /// Ops for one annotation. `color_override` replaces the stored color
    /// (used for the drawing under construction). Anchors that cannot be
    /// placed (non-finite prices) yield no ops.
    pub fn render(&self, annotation: &Annotation, color_override: Option<Color>) -> Vec<DrawOp> {
        if !(annotation.anchor1.price.is_finite() && annotation.anchor2.price.is_finite()) {
            return Vec::new();
        }

        let p1 = self.viewport.domain_to_pixel(&annotation.anchor1);
        let p2 = self.viewport.domain_to_pixel(&annotation.anchor2);
        let color = color_override.unwrap_or(annotation.style.color);
        let stroke = StrokeStyle::solid(color, annotation.style.line_width);

        let mut ops = Vec::new();
        match &annotation.kind {
            AnnotationKind::HorizontalLine => {
                self.horizontal_line(&mut ops, annotation, p1, stroke);
            }
            AnnotationKind::TrendLine => self.trend_line(&mut ops, p1, p2, stroke),
            AnnotationKind::FibRetracement => {
                self.fib_retracement(&mut ops, annotation, p1, p2, stroke);
            }
            AnnotationKind::FibExtension => {
                self.fib_extension(&mut ops, annotation, p1, p2, stroke);
            }
            AnnotationKind::Rectangle => rectangle(&mut ops, p1, p2, stroke),
            AnnotationKind::Ruler => ruler(&mut ops, annotation, p1, p2, stroke),
            AnnotationKind::TextLabel { text } => self.text_label(&mut ops, text, p1, color),
        }
        ops
    }

    /// Every stored annotation in order, then the in-flight one (resolved
    /// against this viewport). The selected and in-flight drawings use
    /// `highlight`.
    pub fn render_all(
        &self,
        annotations: &[Annotation],
        selected: Option<usize>,
        in_flight: Option<&InFlightAnnotation>,
        highlight: Color,
    ) -> Vec<DrawOp> {
        let mut ops: Vec<DrawOp> = annotations
            .iter()
            .enumerate()
            .flat_map(|(index, annotation)| {
                let color = (selected == Some(index)).then_some(highlight);
                self.render(annotation, color)
            })
            .collect();

        if let Some(drawing) = in_flight {
            ops.extend(self.render(&drawing.resolve(self.viewport), Some(highlight)));
        }
        ops
    }

    fn horizontal_line(
        &self,
        ops: &mut Vec<DrawOp>,
        annotation: &Annotation,
        p1: PixelPoint,
        stroke: StrokeStyle,
    ) {
        let right = self.viewport.chart_width();
        ops.push(DrawOp::Line {
            from: PixelPoint::new(0.0, p1.y),
            to: PixelPoint::new(right, p1.y),
            stroke,
        });

        // price tag in the axis margin
        ops.push(DrawOp::FillRect {
            rect: PixelRect::new(
                right,
                p1.y - PRICE_TAG_HEIGHT / 2.0,
                PRICE_TAG_WIDTH,
                PRICE_TAG_HEIGHT,
            ),
            color: stroke.color,
        });
        ops.push(DrawOp::text(
            format_price(annotation.anchor1.price),
            PixelPoint::new(right + 4.0, p1.y + 3.0),
            LABEL_FONT,
            Color::BLACK,
        ));
    }

    fn trend_line(
        &self,
        ops: &mut Vec<DrawOp>,
        p1: PixelPoint,
        p2: PixelPoint,
        stroke: StrokeStyle,
    ) {
        ops.push(DrawOp::Line { from: p1, to: p2, stroke });

        if p2.x != p1.x {
            let slope = (p2.y - p1.y) / (p2.x - p1.x);
            let edge_x = if p2.x < p1.x { 0.0 } else { self.viewport.chart_width() };
            let edge = PixelPoint::new(edge_x, p2.y + slope * (edge_x - p2.x));
            ops.push(DrawOp::Line {
                from: p2,
                to: edge,
                stroke: stroke.dashed(5.0, 5.0).with_opacity(0.5),
            });
        }

        square_handles(ops, &[p1, p2], HANDLE_SIZE, stroke.color);
    }

    fn fib_retracement(
        &self,
        ops: &mut Vec<DrawOp>,
        annotation: &Annotation,
        p1: PixelPoint,
        p2: PixelPoint,
        stroke: StrokeStyle,
    ) {
        ops.push(DrawOp::Line { from: p1, to: p2, stroke });

        let (left, right) = (p1.x.min(p2.x), p1.x.max(p2.x));
        let levels =
            FibonacciSet::Retracement.levels(annotation.anchor1.price, annotation.anchor2.price);
        for level in levels {
            let y = level_value(p1.y, p2.y, level.ratio);
            ops.push(DrawOp::Line {
                from: PixelPoint::new(left, y),
                to: PixelPoint::new(right, y),
                stroke: StrokeStyle::solid(level.color.with_alpha(FIB_LINE_ALPHA), stroke.width)
                    .dashed(2.0, 2.0),
            });
            ops.push(DrawOp::text(
                fib_label(level.ratio, level.price),
                PixelPoint::new(right + 5.0, y + 3.0),
                FIB_FONT,
                level.color,
            ));
        }

        square_handles(ops, &[p1, p2], FIB_HANDLE_SIZE, stroke.color);
    }

    fn fib_extension(
        &self,
        ops: &mut Vec<DrawOp>,
        annotation: &Annotation,
        p1: PixelPoint,
        p2: PixelPoint,
        stroke: StrokeStyle,
    ) {
        ops.push(DrawOp::Line { from: p1, to: p2, stroke });

        let (width, height) = (self.viewport.chart_width(), self.viewport.chart_height());
        let levels =
            FibonacciSet::Extension.levels(annotation.anchor1.price, annotation.anchor2.price);
        for level in levels {
            let y = level_value(p1.y, p2.y, level.ratio);
            if !(0.0..=height).contains(&y) {
                continue;
            }
            ops.push(DrawOp::Line {
                from: PixelPoint::new(0.0, y),
                to: PixelPoint::new(width, y),
                stroke: StrokeStyle::solid(level.color.with_alpha(FIB_LINE_ALPHA), stroke.width)
                    .dashed(2.0, 2.0),
            });
            ops.push(DrawOp::text(
                fib_label(level.ratio, level.price),
                PixelPoint::new(width - FIB_EXT_LABEL_INSET, y - 2.0),
                FIB_FONT,
                level.color,
            ));
        }

        square_handles(ops, &[p1, p2], FIB_HANDLE_SIZE, stroke.color);
    }

    fn text_label(&self, ops: &mut Vec<DrawOp>, text: &str, p1: PixelPoint, color: Color) {
        let width = self.measurer.text_width(text, TEXT_LABEL_FONT);
        ops.push(DrawOp::FillRect {
            rect: PixelRect::new(p1.x - 2.0, p1.y - 2.0, width + 4.0, TEXT_BOX_HEIGHT),
            color: Color::BLACK.with_alpha(0.7),
        });
        ops.push(DrawOp::Text {
            text: text.to_string(),
            at: p1,
            font: TEXT_LABEL_FONT,
            color,
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
        });
        square_handles(ops, &[p1], HANDLE_SIZE, color);
    }
}

fn rectangle(ops: &mut Vec<DrawOp>, p1: PixelPoint, p2: PixelPoint, stroke: StrokeStyle) {
    let rect = PixelRect::spanning(p1, p2);
    ops.push(DrawOp::StrokeRect { rect, stroke });
    ops.push(DrawOp::FillRect { rect, color: stroke.color.with_alpha(RECT_FILL_ALPHA) });

    let corners = [
        p1,
        PixelPoint::new(p2.x, p1.y),
        PixelPoint::new(p1.x, p2.y),
        p2,
    ];
    square_handles(ops, &corners, HANDLE_SIZE, stroke.color);
}

fn ruler(
    ops: &mut Vec<DrawOp>,
    annotation: &Annotation,
    p1: PixelPoint,
    p2: PixelPoint,
    stroke: StrokeStyle,
) {
    ops.push(DrawOp::Line { from: p1, to: p2, stroke });

    let measurement = RulerMeasurement::between(
        annotation.anchor1.price,
        annotation.anchor1.candle_index,
        annotation.anchor2.price,
        annotation.anchor2.candle_index,
    );
    let mid = p1.midpoint(p2);
    ops.push(DrawOp::FillRect {
        rect: PixelRect::new(
            mid.x - RULER_BOX_WIDTH / 2.0,
            mid.y - RULER_BOX_HEIGHT / 2.0,
            RULER_BOX_WIDTH,
            RULER_BOX_HEIGHT,
        ),
        color: Color::BLACK.with_alpha(0.8),
    });

    for (line, dy) in measurement.lines().into_iter().zip([-8.0, 5.0, 18.0]) {
        ops.push(DrawOp::Text {
            text: line,
            at: PixelPoint::new(mid.x, mid.y + dy),
            font: RULER_FONT,
            color: stroke.color,
            align: TextAlign::Center,
            baseline: TextBaseline::Alphabetic,
        });
    }

    for center in [p1, p2] {
        ops.push(DrawOp::FillCircle { center, radius: RULER_HANDLE_RADIUS, color: stroke.color });
    }
}

fn square_handles(ops: &mut Vec<DrawOp>, points: &[PixelPoint], size: f64, color: Color) {
    ops.extend(
        points.iter().map(|&p| DrawOp::FillRect { rect: PixelRect::square(p, size), color }),
    );
}
