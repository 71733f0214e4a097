use crate::domain::market_data::{Candle, price_range};

use super::value_objects::{CanvasSize, ChartMargins, DomainPoint, PixelPoint, ViewState};

/// Fewest candles the engine ever shows, however far it is zoomed in.
pub const MIN_VISIBLE_CANDLES: usize = 5;

/// Coordinate transform for one frame.
///
/// Built from the candle series, the pan/zoom state and the canvas size,
/// it maps canvas pixels to (price, candle index) and back. Both directions
/// read the same window and price span, so they cannot drift apart.
/// Construction fails (returns `None`) when there is nothing to map against:
/// fewer than two candles, an empty visible slice, a degenerate zoom or a
/// canvas smaller than its axes.
#[derive(Debug, Clone)]
pub struct ChartViewport<'a> {
    visible: &'a [Candle],
    start_index: usize,
    visible_count: usize,
    chart_width: f64,
    chart_height: f64,
    price_min: f64,
    price_max: f64,
}

impl<'a> ChartViewport<'a> {
    pub fn new(
        series: &'a [Candle],
        view: ViewState,
        canvas: CanvasSize,
        margins: ChartMargins,
    ) -> Option<Self> {
        if series.len() < 2 || !view.is_valid() {
            return None;
        }

        let (chart_width, chart_height) = margins.plot_area(canvas);
        if !(chart_width > 0.0 && chart_height > 0.0) {
            return None;
        }

        let (start_index, end_index, visible_count) = visible_window(series.len(), view);
        let visible = &series[start_index..end_index];
        let (data_min, data_max) = price_range(visible)?;

        let data_mid = (data_max + data_min) / 2.0;
        let data_span = if data_max > data_min { data_max - data_min } else { 1.0 };
        let half_range = data_span / (2.0 * view.zoom_y);

        Some(Self {
            visible,
            start_index,
            visible_count,
            chart_width,
            chart_height,
            price_min: data_mid - half_range,
            price_max: data_mid + half_range,
        })
    }

    /// Canvas pixel to chart position. The candle index is clamped to the
    /// visible window; the price is not clamped.
    pub fn pixel_to_domain(&self, point: PixelPoint) -> DomainPoint {
        let slot = (point.x / self.slot_width()).floor();
        let last = (self.visible.len() - 1) as f64;
        let relative = if slot.is_finite() { slot.clamp(0.0, last) as usize } else { 0 };

        let price = self.price_max - (point.y / self.chart_height) * self.price_range();
        let time = self.visible[relative].timestamp.value();

        DomainPoint::new(price, self.start_index + relative, time)
    }

    /// Chart position to canvas pixel, centred in its candle slot and
    /// clamped to the drawable area.
    pub fn domain_to_pixel(&self, point: &DomainPoint) -> PixelPoint {
        let slot = self.slot_width();
        let relative = point.candle_index as f64 - self.start_index as f64;
        let x = relative * slot + slot / 2.0;
        let y = self.price_to_y(point.price);

        PixelPoint::new(x.clamp(0.0, self.chart_width), y.clamp(0.0, self.chart_height))
    }

    /// Unclamped vertical position of a price.
    pub fn price_to_y(&self, price: f64) -> f64 {
        self.chart_height - ((price - self.price_min) / self.price_range()) * self.chart_height
    }

    /// Width of one candle slot in pixels.
    pub fn slot_width(&self) -> f64 {
        self.chart_width / self.visible.len() as f64
    }

    pub fn price_range(&self) -> f64 {
        let range = self.price_max - self.price_min;
        if range > 0.0 { range } else { 1.0 }
    }

    pub fn price_bounds(&self) -> (f64, f64) {
        (self.price_min, self.price_max)
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.start_index + self.visible.len()
    }

    /// Candle count requested by the zoom level; the slice may be shorter
    /// near the start of the series.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn chart_width(&self) -> f64 {
        self.chart_width
    }

    pub fn chart_height(&self) -> f64 {
        self.chart_height
    }
}

/// `(start, end, visible_count)` of the window the engine renders.
pub fn visible_window(series_len: usize, view: ViewState) -> (usize, usize, usize) {
    let by_zoom = (series_len as f64 / view.zoom_x).floor();
    // float-to-int casts saturate, so an extreme zoom-out cannot overflow
    let visible_count = if by_zoom > MIN_VISIBLE_CANDLES as f64 {
        by_zoom as usize
    } else {
        MIN_VISIBLE_CANDLES
    };

    let start = series_len as f64 - visible_count as f64 - view.pan_x.floor();
    let start_index = (start.max(0.0) as usize).min(series_len);
    let end_index = series_len.min(start_index.saturating_add(visible_count));
    (start_index, end_index, visible_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_zoom_and_pan() {
        assert_eq!(visible_window(100, ViewState::default()), (0, 100, 100));
        assert_eq!(visible_window(100, ViewState::new(2.0, 1.0, 0.0)), (50, 100, 50));
        assert_eq!(visible_window(100, ViewState::new(2.0, 1.0, 10.5)), (40, 90, 50));
        // never fewer than five candles requested
        assert_eq!(visible_window(10, ViewState::new(100.0, 1.0, 0.0)), (5, 10, 5));
        assert_eq!(visible_window(3, ViewState::default()), (0, 3, 5));
    }

    #[test]
    fn panning_past_the_end_empties_the_window() {
        let (start, end, _) = visible_window(10, ViewState::new(1.0, 1.0, -20.0));
        assert_eq!(start, end);
    }
}
