use crate::domain::drawing::ChartKey;
use crate::domain::market_data::Candle;

use super::value_objects::{CanvasSize, ViewState};

/// Interface to the chart engine the drawing layer sits on.
///
/// Everything here is read-only except `request_redraw`, which asks the
/// engine to repaint candles and then call back into the overlay renderer.
pub trait ChartEngine {
    /// Instrument/timeframe currently shown.
    fn active_key(&self) -> ChartKey;

    /// Candle series for a key, oldest first. Empty when not loaded.
    fn candles(&self, key: &ChartKey) -> &[Candle];

    /// Current zoom factors and pan offset.
    fn view_state(&self) -> ViewState;

    /// Size of the chart body in CSS pixels, axes included.
    fn canvas_size(&self) -> CanvasSize;

    /// True while the engine's own pan drag owns the pointer.
    fn is_panning(&self) -> bool {
        false
    }

    fn request_redraw(&self);
}
