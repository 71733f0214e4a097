use std::cell::Cell;
use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::chart::{CanvasSize, ChartEngine, ViewState};
use crate::domain::drawing::ChartKey;
use crate::domain::market_data::{Candle, OHLCV, Price, Timestamp, Volume};

/// Candle as the host page sends it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CandleDto {
    pub t: u64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    #[serde(default)]
    pub v: f64,
}

impl From<CandleDto> for Candle {
    fn from(dto: CandleDto) -> Self {
        Candle::new(
            Timestamp::from_millis(dto.t),
            OHLCV::new(
                Price::from(dto.o),
                Price::from(dto.h),
                Price::from(dto.l),
                Price::from(dto.c),
                Volume::from(dto.v),
            ),
        )
    }
}

/// Snapshot of the host chart engine, kept current by the wasm API.
///
/// Redraw requests only raise a flag; the API fires the host callback once
/// the controller call has returned, so the host may call straight back in.
pub struct HostChart {
    active: ChartKey,
    series: HashMap<ChartKey, Vec<Candle>>,
    view: ViewState,
    canvas: CanvasSize,
    panning: bool,
    redraw_requested: Cell<bool>,
}

impl HostChart {
    pub fn new(active: ChartKey) -> Self {
        Self {
            active,
            series: HashMap::new(),
            view: ViewState::default(),
            canvas: CanvasSize::new(0.0, 0.0),
            panning: false,
            redraw_requested: Cell::new(false),
        }
    }

    pub fn set_active(&mut self, key: ChartKey) {
        self.active = key;
    }

    pub fn set_candles(&mut self, key: ChartKey, candles: Vec<Candle>) {
        self.series.insert(key, candles);
    }

    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn set_panning(&mut self, panning: bool) {
        self.panning = panning;
    }

    pub fn take_redraw_request(&self) -> bool {
        self.redraw_requested.replace(false)
    }
}

impl ChartEngine for HostChart {
    fn active_key(&self) -> ChartKey {
        self.active.clone()
    }

    fn candles(&self, key: &ChartKey) -> &[Candle] {
        self.series.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    fn view_state(&self) -> ViewState {
        self.view
    }

    fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    fn is_panning(&self) -> bool {
        self.panning
    }

    fn request_redraw(&self) {
        self.redraw_requested.set(true);
    }
}
