use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

use crate::application::{DrawOp, StrokeStyle, TextMeasurer};
use crate::domain::chart::Color;
use crate::domain::errors::{DrawingError, DrawingResult};
use crate::domain::logging::LogComponent;

/// Replays `DrawOp`s on the chart's shared 2D context.
///
/// Every op runs between `save`/`restore`, so dash, alpha and font settings
/// never leak into the chart engine's own drawing.
pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }

    pub fn draw_all(&self, ops: &[DrawOp]) -> DrawingResult<()> {
        for op in ops {
            self.context.save();
            let result = self.draw(op);
            self.context.restore();
            result.map_err(|e| DrawingError::Rendering(format!("{e:?}")))?;
        }

        crate::log_trace!(
            LogComponent::Canvas,
            "Drew {} overlay ops",
            ops.len()
        );
        Ok(())
    }

    fn draw(&self, op: &DrawOp) -> Result<(), JsValue> {
        let ctx = &self.context;
        match op {
            DrawOp::Line { from, to, stroke } => {
                self.apply_stroke(stroke)?;
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
            }
            DrawOp::StrokeRect { rect, stroke } => {
                self.apply_stroke(stroke)?;
                ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
            }
            DrawOp::FillRect { rect, color } => {
                ctx.set_fill_style(&css(color));
                ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
            }
            DrawOp::FillCircle { center, radius, color } => {
                ctx.set_fill_style(&css(color));
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, std::f64::consts::TAU)?;
                ctx.fill();
            }
            DrawOp::Text { text, at, font, color, align, baseline } => {
                ctx.set_font(font);
                ctx.set_fill_style(&css(color));
                ctx.set_text_align(align.as_css());
                ctx.set_text_baseline(baseline.as_css());
                ctx.fill_text(text, at.x, at.y)?;
            }
        }
        Ok(())
    }

    fn apply_stroke(&self, stroke: &StrokeStyle) -> Result<(), JsValue> {
        let dash: js_sys::Array = stroke.dash.segments().into_iter().map(JsValue::from).collect();
        self.context.set_stroke_style(&css(&stroke.color));
        self.context.set_line_width(stroke.width);
        self.context.set_global_alpha(stroke.opacity);
        self.context.set_line_dash(&dash)
    }
}

impl TextMeasurer for CanvasRenderer {
    fn text_width(&self, text: &str, font: &'static str) -> f64 {
        self.context.save();
        self.context.set_font(font);
        let width = self.context.measure_text(text).map(|metrics| metrics.width()).unwrap_or(0.0);
        self.context.restore();
        width
    }
}

fn css(color: &Color) -> JsValue {
    JsValue::from_str(&color.to_css())
}

