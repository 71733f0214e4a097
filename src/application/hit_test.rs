use crate::domain::chart::{ChartViewport, PixelPoint, PixelRect};
use crate::domain::drawing::{Annotation, AnnotationKind};

use super::draw_ops::{TEXT_LABEL_FONT, TextMeasurer};

/// Index of the topmost annotation under `point`, if any.
///
/// Later annotations are drawn over earlier ones, so the search runs from
/// the end of the list. Anchor handles are checked before bodies.
pub fn annotation_at(
    annotations: &[Annotation],
    viewport: &ChartViewport<'_>,
    point: PixelPoint,
    tolerance: f64,
    measurer: &dyn TextMeasurer,
) -> Option<usize> {
    let probe = HitProbe { viewport, point, tolerance, measurer };

    annotations
        .iter()
        .enumerate()
        .rev()
        .find(|(_, annotation)| probe.hits_handle(annotation))
        .or_else(|| {
            annotations.iter().enumerate().rev().find(|(_, annotation)| probe.hits_body(annotation))
        })
        .map(|(index, _)| index)
}

struct HitProbe<'p, 'a> {
    viewport: &'p ChartViewport<'a>,
    point: PixelPoint,
    tolerance: f64,
    measurer: &'p dyn TextMeasurer,
}

impl HitProbe<'_, '_> {
    fn anchors(&self, annotation: &Annotation) -> (PixelPoint, PixelPoint) {
        (
            self.viewport.domain_to_pixel(&annotation.anchor1),
            self.viewport.domain_to_pixel(&annotation.anchor2),
        )
    }

    fn near(&self, target: PixelPoint) -> bool {
        self.point.distance_to(target) <= self.tolerance
    }

    fn hits_handle(&self, annotation: &Annotation) -> bool {
        let (p1, p2) = self.anchors(annotation);
        match annotation.kind {
            // the second anchor of a horizontal line carries no meaning
            AnnotationKind::HorizontalLine | AnnotationKind::TextLabel { .. } => self.near(p1),
            AnnotationKind::Rectangle => [
                p1,
                PixelPoint::new(p2.x, p1.y),
                PixelPoint::new(p1.x, p2.y),
                p2,
            ]
            .into_iter()
            .any(|corner| self.near(corner)),
            _ => self.near(p1) || self.near(p2),
        }
    }

    fn hits_body(&self, annotation: &Annotation) -> bool {
        let (p1, p2) = self.anchors(annotation);
        match &annotation.kind {
            AnnotationKind::HorizontalLine => {
                (self.point.y - p1.y).abs() <= self.tolerance
                    && (0.0..=self.viewport.chart_width()).contains(&self.point.x)
            }
            AnnotationKind::Rectangle => {
                let rect = PixelRect::spanning(p1, p2);
                let corners = [
                    PixelPoint::new(rect.x, rect.y),
                    PixelPoint::new(rect.x + rect.width, rect.y),
                    PixelPoint::new(rect.x + rect.width, rect.y + rect.height),
                    PixelPoint::new(rect.x, rect.y + rect.height),
                ];
                (0..4).any(|i| self.near_segment(corners[i], corners[(i + 1) % 4]))
            }
            AnnotationKind::TextLabel { text } => {
                let width = self.measurer.text_width(text, TEXT_LABEL_FONT);
                PixelRect::new(p1.x - 2.0, p1.y - 2.0, width + 4.0, 18.0).contains(self.point)
            }
            AnnotationKind::TrendLine
            | AnnotationKind::FibRetracement
            | AnnotationKind::FibExtension
            | AnnotationKind::Ruler => self.near_segment(p1, p2),
        }
    }

    fn near_segment(&self, a: PixelPoint, b: PixelPoint) -> bool {
        distance_to_segment(self.point, a, b) <= self.tolerance
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: PixelPoint, a: PixelPoint, b: PixelPoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance_to(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance_to(PixelPoint::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance() {
        let a = PixelPoint::new(0.0, 0.0);
        let b = PixelPoint::new(10.0, 0.0);
        assert_eq!(distance_to_segment(PixelPoint::new(5.0, 3.0), a, b), 3.0);
        // beyond the end the distance is to the endpoint
        assert_eq!(distance_to_segment(PixelPoint::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(PixelPoint::new(3.0, 4.0), a, a), 5.0);
    }
}
