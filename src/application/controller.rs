use crate::domain::chart::{ChartEngine, ChartViewport, PixelPoint};
use crate::domain::drawing::{
    Annotation, AnnotationKind, DrawingTool, IdGenerator, InFlightAnnotation, KeyValueStorage,
};
use crate::domain::logging::{LogComponent, get_logger, now_ms};

use super::annotation_store::AnnotationStore;
use super::config::DrawingConfig;
use super::draw_ops::{DrawOp, TextMeasurer};
use super::hit_test::annotation_at;
use super::renderer::AnnotationRenderer;

/// Where the pointer/keyboard state machine currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Tool armed, pointer up.
    Creating { tool: DrawingTool },
    /// Pointer down, drawing follows the pointer.
    Dragging { in_flight: InFlightAnnotation },
    /// Text label released, waiting for `submit_text`.
    AwaitingText { in_flight: InFlightAnnotation },
}

impl InteractionState {
    pub fn active_tool(&self) -> Option<DrawingTool> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Creating { tool } => Some(*tool),
            InteractionState::Dragging { in_flight }
            | InteractionState::AwaitingText { in_flight } => Some(in_flight.tool()),
        }
    }

    pub fn in_flight(&self) -> Option<&InFlightAnnotation> {
        match self {
            InteractionState::Dragging { in_flight }
            | InteractionState::AwaitingText { in_flight } => Some(in_flight),
            _ => None,
        }
    }
}

/// What a handler did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not ours; let the chart handle it.
    Ignored,
    /// Consumed; stop propagation.
    Handled,
    /// A text label needs its text. Answer with `submit_text`.
    TextRequested { placeholder: String },
    /// Ctrl+Shift+D pressed. Answer with `confirm_clear`.
    ClearConfirmationRequested,
}

impl EventOutcome {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, EventOutcome::Ignored)
    }
}

/// Key press as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn plain(key: impl Into<String>) -> Self {
        Self { key: key.into(), ctrl: false, shift: false }
    }

    pub fn ctrl_shift(key: impl Into<String>) -> Self {
        Self { key: key.into(), ctrl: true, shift: true }
    }
}

/// Session state plus the store: the single owner of everything the drawing
/// layer mutates. Event handlers take the chart engine by reference and
/// only ever ask it to redraw.
pub struct DrawingController<S: KeyValueStorage> {
    store: AnnotationStore<S>,
    config: DrawingConfig,
    ids: IdGenerator,
    state: InteractionState,
    selected: Option<usize>,
    clear_pending: bool,
}

impl<S: KeyValueStorage> DrawingController<S> {
    /// Restores saved drawings from `storage` under the configured key.
    pub fn new(storage: S, config: DrawingConfig, id_seed: u32) -> Self {
        let store = AnnotationStore::open(storage, config.storage_key.clone());
        Self {
            store,
            config,
            ids: IdGenerator::new(id_seed),
            state: InteractionState::Idle,
            selected: None,
            clear_pending: false,
        }
    }

    /// Arm `tool`, or disarm it when it is already armed. Any drawing in
    /// progress is discarded.
    pub fn select_tool(&mut self, chart: &impl ChartEngine, tool: DrawingTool) -> EventOutcome {
        self.state = if self.state.active_tool() == Some(tool) {
            InteractionState::Idle
        } else {
            InteractionState::Creating { tool }
        };
        self.selected = None;

        let message = match self.state.active_tool() {
            Some(active) => format!("🖊️ Tool {} armed", active.as_ref()),
            None => "🖊️ Tool off".to_string(),
        };
        get_logger().info(LogComponent::Controller, &message);
        chart.request_redraw();
        EventOutcome::Handled
    }

    pub fn deactivate_tool(&mut self, chart: &impl ChartEngine) -> EventOutcome {
        self.reset(chart);
        EventOutcome::Handled
    }

    /// Starts a drawing when a tool is armed, otherwise selects what lies
    /// under the pointer. `measurer` must be the one the overlay is drawn
    /// with so text label boxes hit where they appear.
    pub fn pointer_down(
        &mut self,
        chart: &impl ChartEngine,
        at: PixelPoint,
        measurer: &dyn TextMeasurer,
    ) -> EventOutcome {
        if chart.is_panning() {
            return EventOutcome::Ignored;
        }

        match self.state {
            InteractionState::Creating { tool } => {
                let now = now_ms();
                let in_flight = InFlightAnnotation::start(
                    self.ids.next_id(now),
                    AnnotationKind::for_tool(tool, &self.config.text_placeholder),
                    at,
                    self.config.annotation_style(),
                    now,
                );
                self.state = InteractionState::Dragging { in_flight };
                self.selected = None;
                chart.request_redraw();
                EventOutcome::Handled
            }
            InteractionState::Idle => self.select_at(chart, at, measurer),
            _ => EventOutcome::Ignored,
        }
    }

    pub fn pointer_move(&mut self, chart: &impl ChartEngine, at: PixelPoint) -> EventOutcome {
        match &mut self.state {
            InteractionState::Dragging { in_flight } => {
                in_flight.anchor2 = at;
                chart.request_redraw();
                EventOutcome::Handled
            }
            _ => EventOutcome::Ignored,
        }
    }

    /// Finalize the drawing under the pointer. Text labels are not committed
    /// here; they wait for `submit_text`.
    pub fn pointer_up(&mut self, chart: &impl ChartEngine, at: PixelPoint) -> EventOutcome {
        let mut in_flight = match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Dragging { in_flight } => in_flight,
            other => {
                self.state = other;
                return EventOutcome::Ignored;
            }
        };

        in_flight.anchor2 = at;
        match in_flight.tool() {
            DrawingTool::HorizontalLine => {
                in_flight.anchor2.x = chart.canvas_size().width;
            }
            DrawingTool::TextLabel => {
                self.state = InteractionState::AwaitingText { in_flight };
                chart.request_redraw();
                return EventOutcome::TextRequested {
                    placeholder: self.config.text_placeholder.clone(),
                };
            }
            _ => {}
        }

        self.commit(chart, in_flight);
        EventOutcome::Handled
    }

    /// Answer to `TextRequested`. `None` or blank text discards the label.
    pub fn submit_text(&mut self, chart: &impl ChartEngine, text: Option<String>) -> EventOutcome {
        let mut in_flight = match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::AwaitingText { in_flight } => in_flight,
            other => {
                self.state = other;
                return EventOutcome::Ignored;
            }
        };

        match text.filter(|value| !value.trim().is_empty()) {
            Some(value) => {
                in_flight.set_text(value);
                self.commit(chart, in_flight);
            }
            None => {
                crate::log_debug!(
                    LogComponent::Controller,
                    "Text label cancelled"
                );
                self.state = InteractionState::Creating { tool: in_flight.tool() };
                chart.request_redraw();
            }
        }
        EventOutcome::Handled
    }

    pub fn key_down(&mut self, chart: &impl ChartEngine, input: &KeyInput) -> EventOutcome {
        match input.key.as_str() {
            "Escape" => {
                self.reset(chart);
                EventOutcome::Handled
            }
            "Delete" | "Backspace" => self.delete_selected(chart),
            key if input.ctrl && input.shift && key.eq_ignore_ascii_case("d") => {
                self.clear_pending = true;
                EventOutcome::ClearConfirmationRequested
            }
            _ => EventOutcome::Ignored,
        }
    }

    /// Answer to `ClearConfirmationRequested`.
    pub fn confirm_clear(&mut self, chart: &impl ChartEngine, confirmed: bool) -> EventOutcome {
        if !std::mem::take(&mut self.clear_pending) {
            return EventOutcome::Ignored;
        }
        if confirmed {
            let key = chart.active_key();
            self.store.clear(&key);
            self.selected = None;
            chart.request_redraw();
        }
        EventOutcome::Handled
    }

    /// Select a stored drawing of the current chart by index, or clear the
    /// selection. Out-of-range indices clear it.
    pub fn select(&mut self, chart: &impl ChartEngine, index: Option<usize>) {
        let len = self.store.get(&chart.active_key()).len();
        self.selected = index.filter(|&i| i < len);
        chart.request_redraw();
    }

    /// Ops for every drawing of the current chart plus the one in progress.
    /// Empty when the chart cannot be mapped this frame.
    pub fn render_overlay(
        &self,
        chart: &impl ChartEngine,
        measurer: &dyn TextMeasurer,
    ) -> Vec<DrawOp> {
        let key = chart.active_key();
        let Some(viewport) = self.viewport(chart) else {
            return Vec::new();
        };

        AnnotationRenderer::new(&viewport, measurer).render_all(
            self.store.get(&key),
            self.selected,
            self.state.in_flight(),
            self.config.highlight_color,
        )
    }

    /// CSS cursor for the chart body.
    pub fn cursor(&self) -> &'static str {
        if self.state.active_tool().is_some() { "crosshair" } else { "default" }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn active_tool(&self) -> Option<DrawingTool> {
        self.state.active_tool()
    }

    pub fn in_flight(&self) -> Option<&InFlightAnnotation> {
        self.state.in_flight()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn annotations(&mut self, chart: &impl ChartEngine) -> &[Annotation] {
        self.store.list_for(&chart.active_key())
    }

    pub fn store(&self) -> &AnnotationStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore<S> {
        &mut self.store
    }

    pub fn config(&self) -> &DrawingConfig {
        &self.config
    }

    fn viewport<'c>(&self, chart: &'c impl ChartEngine) -> Option<ChartViewport<'c>> {
        let key = chart.active_key();
        ChartViewport::new(
            chart.candles(&key),
            chart.view_state(),
            chart.canvas_size(),
            self.config.margins,
        )
    }

    fn commit(&mut self, chart: &impl ChartEngine, in_flight: InFlightAnnotation) {
        let tool = in_flight.tool();
        self.state = InteractionState::Creating { tool };

        match self.viewport(chart) {
            Some(viewport) => {
                let annotation = in_flight.commit(&viewport);
                self.store.append_current(chart, annotation);
            }
            None => get_logger().warn(
                LogComponent::Controller,
                &format!("⚠️ No chart data to anchor {} to, drawing discarded", tool.as_ref()),
            ),
        }
        chart.request_redraw();
    }

    fn select_at(
        &mut self,
        chart: &impl ChartEngine,
        at: PixelPoint,
        measurer: &dyn TextMeasurer,
    ) -> EventOutcome {
        let key = chart.active_key();
        let hit = self.viewport(chart).and_then(|viewport| {
            annotation_at(
                self.store.get(&key),
                &viewport,
                at,
                self.config.hit_tolerance_px,
                measurer,
            )
        });

        let changed = hit != self.selected;
        self.selected = hit;
        if changed {
            chart.request_redraw();
        }
        if hit.is_some() { EventOutcome::Handled } else { EventOutcome::Ignored }
    }

    fn delete_selected(&mut self, chart: &impl ChartEngine) -> EventOutcome {
        if matches!(self.state, InteractionState::AwaitingText { .. }) {
            return EventOutcome::Ignored;
        }
        let Some(index) = self.selected.take() else {
            return EventOutcome::Ignored;
        };

        let key = chart.active_key();
        if let Some(removed) = self.store.delete_at(&key, index) {
            get_logger().info(
                LogComponent::Controller,
                &format!("🗑️ Deleted {} {}", removed.tool().as_ref(), removed.id),
            );
        }
        chart.request_redraw();
        EventOutcome::Handled
    }

    fn reset(&mut self, chart: &impl ChartEngine) {
        self.state = InteractionState::Idle;
        self.selected = None;
        self.clear_pending = false;
        chart.request_redraw();
    }
}
