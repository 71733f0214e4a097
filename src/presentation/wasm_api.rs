use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Function, Promise};
use leptos::{Callback, SignalSet, WriteSignal, create_signal, view};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{CanvasRenderingContext2d, Element, HtmlElement, KeyboardEvent, MouseEvent};

use crate::application::{
    DrawingConfig, DrawingController, EventOutcome, FixedWidthMeasurer, KeyInput, TextMeasurer,
};
use crate::domain::chart::{CanvasSize, PixelPoint, ViewState};
use crate::domain::drawing::{ChartKey, DrawingTool, KeyValueStorage};
use crate::domain::errors::DrawingError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, Symbol, TimeInterval};
use crate::infrastructure::{BrowserLocalStorage, CanvasRenderer, InMemoryStorage};

use super::host_chart::{CandleDto, HostChart};
use super::toolbar::DrawingToolbar;

type Controller = DrawingController<Box<dyn KeyValueStorage>>;

struct Session {
    controller: Controller,
    chart: HostChart,
    on_redraw: Option<Function>,
    on_text_requested: Option<Function>,
    on_clear_requested: Option<Function>,
    chart_body: Option<HtmlElement>,
    /// Renderer of the last overlay frame; text is measured with its context.
    overlay: Option<CanvasRenderer>,
    toolbar: Option<WriteSignal<Option<DrawingTool>>>,
}

/// Drawing tools for a host chart page.
///
/// The host feeds candles, zoom/pan and canvas size, forwards pointer and
/// keyboard events (or lets `attach` listen for them), and calls
/// `renderOverlay` from its own redraw after painting candles.
#[wasm_bindgen]
pub struct DrawingToolsApi {
    session: Rc<RefCell<Session>>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl DrawingToolsApi {
    /// `config_json` may hold any subset of the drawing config fields.
    #[wasm_bindgen(constructor)]
    pub fn new(
        symbol: String,
        interval: String,
        config_json: Option<String>,
    ) -> Result<DrawingToolsApi, JsValue> {
        let config = match config_json {
            Some(json) => DrawingConfig::from_json(&json)?,
            None => DrawingConfig::default(),
        };

        let storage: Box<dyn KeyValueStorage> = match BrowserLocalStorage::new() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                get_logger().warn(
                    LogComponent::Api,
                    &format!("⚠️ {e}; drawings will not survive a reload"),
                );
                Box::new(InMemoryStorage::new())
            }
        };

        let seed = (js_sys::Math::random() * f64::from(u32::MAX)) as u32;
        let session = Session {
            controller: DrawingController::new(storage, config, seed),
            chart: HostChart::new(parse_key(&symbol, &interval)?),
            on_redraw: None,
            on_text_requested: None,
            on_clear_requested: None,
            chart_body: None,
            overlay: None,
            toolbar: None,
        };

        get_logger().info(
            LogComponent::Api,
            &format!("🚀 Drawing tools ready for {symbol} {interval}"),
        );
        Ok(Self { session: Rc::new(RefCell::new(session)), listeners: Vec::new() })
    }

    #[wasm_bindgen(js_name = setActiveChart)]
    pub fn set_active_chart(&self, symbol: &str, interval: &str) -> Result<(), JsValue> {
        let key = parse_key(symbol, interval)?;
        run(&self.session, |s| {
            s.chart.set_active(key);
            s.controller.select(&s.chart, None);
        });
        Ok(())
    }

    /// `candles`: array of `{t, o, h, l, c, v}`, oldest first.
    #[wasm_bindgen(js_name = setCandles)]
    pub fn set_candles(
        &self,
        symbol: &str,
        interval: &str,
        candles: JsValue,
    ) -> Result<(), JsValue> {
        let key = parse_key(symbol, interval)?;
        let dtos: Vec<CandleDto> = candles
            .into_serde()
            .map_err(|e| DrawingError::InvalidInput(format!("candles: {e}")))?;
        let candles: Vec<Candle> = dtos.into_iter().map(Candle::from).collect();
        self.session.borrow_mut().chart.set_candles(key, candles);
        Ok(())
    }

    #[wasm_bindgen(js_name = setViewState)]
    pub fn set_view_state(&self, zoom_x: f64, zoom_y: f64, pan_x: f64) {
        self.session.borrow_mut().chart.set_view(ViewState::new(zoom_x, zoom_y, pan_x));
    }

    #[wasm_bindgen(js_name = setCanvasSize)]
    pub fn set_canvas_size(&self, width: f64, height: f64) {
        self.session.borrow_mut().chart.set_canvas(CanvasSize::new(width, height));
    }

    /// Tell the drawing layer the chart's own pan drag is in progress.
    #[wasm_bindgen(js_name = setPanning)]
    pub fn set_panning(&self, panning: bool) {
        self.session.borrow_mut().chart.set_panning(panning);
    }

    #[wasm_bindgen(js_name = onRedraw)]
    pub fn on_redraw(&self, callback: Function) {
        self.session.borrow_mut().on_redraw = Some(callback);
    }

    /// `callback(placeholder)` returns the label text, or a Promise of it.
    /// `null`/empty cancels. Without a callback `window.prompt` is used.
    #[wasm_bindgen(js_name = onTextRequested)]
    pub fn on_text_requested(&self, callback: Function) {
        self.session.borrow_mut().on_text_requested = Some(callback);
    }

    /// `callback()` returns a boolean, or a Promise of one. Without a
    /// callback `window.confirm` is used.
    #[wasm_bindgen(js_name = onClearRequested)]
    pub fn on_clear_requested(&self, callback: Function) {
        self.session.borrow_mut().on_clear_requested = Some(callback);
    }

    /// Arm a tool by id (`hline`, `trendline`, `fib_ret`, `fib_ext`,
    /// `rectangle`, `ruler`, `text`); arming the armed tool disarms it.
    #[wasm_bindgen(js_name = selectTool)]
    pub fn select_tool(&self, tool: &str) -> Result<(), JsValue> {
        let tool = DrawingTool::from_str(tool)
            .map_err(|_| DrawingError::InvalidInput(format!("unknown drawing tool `{tool}`")))?;
        run(&self.session, |s| s.controller.select_tool(&s.chart, tool));
        Ok(())
    }

    #[wasm_bindgen(js_name = deactivateTool)]
    pub fn deactivate_tool(&self) {
        run(&self.session, |s| s.controller.deactivate_tool(&s.chart));
    }

    #[wasm_bindgen(js_name = activeTool)]
    pub fn active_tool(&self) -> Option<String> {
        self.session.borrow().controller.active_tool().map(|tool| tool.as_ref().to_string())
    }

    pub fn cursor(&self) -> String {
        self.session.borrow().controller.cursor().to_string()
    }

    #[wasm_bindgen(js_name = selectedIndex)]
    pub fn selected_index(&self) -> Option<usize> {
        self.session.borrow().controller.selected_index()
    }

    /// Returns true when the event was consumed.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64) -> bool {
        let at = PixelPoint::new(x, y);
        dispatch(&self.session, |s| {
            s.controller.pointer_down(&s.chart, at, text_measurer(&s.overlay))
        })
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        dispatch(&self.session, |s| s.controller.pointer_move(&s.chart, PixelPoint::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, x: f64, y: f64) -> bool {
        dispatch(&self.session, |s| s.controller.pointer_up(&s.chart, PixelPoint::new(x, y)))
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&self, key: String, ctrl: bool, shift: bool) -> bool {
        let input = KeyInput { key, ctrl, shift };
        dispatch(&self.session, |s| s.controller.key_down(&s.chart, &input))
    }

    /// Answer a pending text request directly.
    #[wasm_bindgen(js_name = submitText)]
    pub fn submit_text(&self, text: Option<String>) {
        run(&self.session, |s| s.controller.submit_text(&s.chart, text));
    }

    /// Answer a pending clear-all confirmation directly.
    #[wasm_bindgen(js_name = confirmClear)]
    pub fn confirm_clear(&self, confirmed: bool) {
        run(&self.session, |s| s.controller.confirm_clear(&s.chart, confirmed));
    }

    /// Draw every annotation of the active chart on `context`.
    #[wasm_bindgen(js_name = renderOverlay)]
    pub fn render_overlay(&self, context: CanvasRenderingContext2d) -> Result<(), JsValue> {
        let renderer = CanvasRenderer::new(context);
        let mut session = self.session.borrow_mut();
        let ops = session.controller.render_overlay(&session.chart, &renderer);
        renderer.draw_all(&ops)?;
        session.overlay = Some(renderer);
        Ok(())
    }

    /// Annotations of the active chart as JSON.
    #[wasm_bindgen(js_name = annotationsJson)]
    pub fn annotations_json(&self) -> Result<String, JsValue> {
        let mut session = self.session.borrow_mut();
        let Session { controller, chart, .. } = &mut *session;
        let json = serde_json::to_string(controller.annotations(&*chart))
            .map_err(DrawingError::from)?;
        Ok(json)
    }

    /// Listen for mouse events on the chart body and keys on the window.
    /// Coordinates are taken relative to `chart_body`.
    pub fn attach(&mut self, chart_body: HtmlElement) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        self.listeners.clear();
        self.session.borrow_mut().chart_body = Some(chart_body.clone());

        let capture = EventListenerOptions::run_in_capture_phase();
        for event_type in ["mousedown", "mousemove", "mouseup"] {
            let session = Rc::clone(&self.session);
            let body = chart_body.clone();
            self.listeners.push(EventListener::new_with_options(
                &chart_body,
                event_type,
                capture,
                move |event| {
                    let Some(mouse) = event.dyn_ref::<MouseEvent>() else { return };
                    let at = pointer_position(
                        &body,
                        f64::from(mouse.client_x()),
                        f64::from(mouse.client_y()),
                    );
                    let consumed = dispatch(&session, |s| match event_type {
                        "mousedown" => {
                            s.controller.pointer_down(&s.chart, at, text_measurer(&s.overlay))
                        }
                        "mousemove" => s.controller.pointer_move(&s.chart, at),
                        _ => s.controller.pointer_up(&s.chart, at),
                    });
                    if consumed {
                        event.stop_propagation();
                    }
                },
            ));
        }

        let session = Rc::clone(&self.session);
        self.listeners.push(EventListener::new_with_options(
            &window,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>() else { return };
                let input = KeyInput {
                    key: key.key(),
                    ctrl: key.ctrl_key() || key.meta_key(),
                    shift: key.shift_key(),
                };
                if dispatch(&session, |s| s.controller.key_down(&s.chart, &input)) {
                    event.prevent_default();
                }
            },
        ));

        get_logger().info(
            LogComponent::Api,
            "🖱️ Listening for chart pointer and keyboard events",
        );
        Ok(())
    }

    /// Remove the listeners installed by `attach`.
    pub fn detach(&mut self) {
        self.listeners.clear();
        self.session.borrow_mut().chart_body = None;
    }

    /// Mount the tool buttons into `container`.
    #[wasm_bindgen(js_name = mountToolbar)]
    pub fn mount_toolbar(&self, container: HtmlElement) {
        let session = Rc::clone(&self.session);
        leptos::mount_to(container, move || {
            let initial = session.borrow().controller.active_tool();
            let (active, set_active) = create_signal(initial);
            session.borrow_mut().toolbar = Some(set_active);

            let on_select = Callback::new(move |tool: DrawingTool| {
                run(&session, |s| s.controller.select_tool(&s.chart, tool));
            });
            view! { <DrawingToolbar active=active on_select=on_select/> }
        });
    }
}

/// Client coordinates relative to `chart_body`'s border box, whatever
/// child element the event landed on.
pub fn pointer_position(chart_body: &Element, client_x: f64, client_y: f64) -> PixelPoint {
    let rect = chart_body.get_bounding_client_rect();
    PixelPoint::new(client_x - rect.left(), client_y - rect.top())
}

fn text_measurer(overlay: &Option<CanvasRenderer>) -> &dyn TextMeasurer {
    match overlay {
        Some(renderer) => renderer,
        None => &FixedWidthMeasurer::MONO_14PX,
    }
}

fn parse_key(symbol: &str, interval: &str) -> Result<ChartKey, DrawingError> {
    let symbol = Symbol::new(symbol.to_string()).map_err(DrawingError::InvalidInput)?;
    let interval = TimeInterval::from_str(interval)
        .map_err(|_| DrawingError::InvalidInput(format!("unknown timeframe `{interval}`")))?;
    Ok(ChartKey::new(symbol, interval))
}

/// Run `f` against the session, then sync the host: redraw callback, cursor
/// and toolbar. The session borrow is released before any JS is called.
fn run<R>(session: &Rc<RefCell<Session>>, f: impl FnOnce(&mut Session) -> R) -> R {
    let (result, redraw, body, toolbar, active, cursor) = {
        let mut s = session.borrow_mut();
        let result = f(&mut s);
        let redraw = if s.chart.take_redraw_request() { s.on_redraw.clone() } else { None };
        let active = s.controller.active_tool();
        let cursor = s.controller.cursor();
        (result, redraw, s.chart_body.clone(), s.toolbar, active, cursor)
    };

    if let Some(body) = body {
        if let Err(e) = body.style().set_property("cursor", cursor) {
            get_logger().debug(LogComponent::Api, &format!("Cursor not updated: {e:?}"));
        }
    }
    if let Some(toolbar) = toolbar {
        toolbar.set(active);
    }
    if let Some(callback) = redraw {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            get_logger().error(
                LogComponent::Api,
                &format!("❌ Redraw callback failed: {e:?}"),
            );
        }
    }
    result
}

/// Run an event handler and follow up on text/confirm requests. Returns
/// whether the event was consumed.
fn dispatch(
    session: &Rc<RefCell<Session>>,
    f: impl FnOnce(&mut Session) -> EventOutcome,
) -> bool {
    let outcome = run(session, f);
    let consumed = outcome.is_consumed();

    match outcome {
        EventOutcome::TextRequested { placeholder } => request_text(session, placeholder),
        EventOutcome::ClearConfirmationRequested => request_clear_confirmation(session),
        EventOutcome::Ignored | EventOutcome::Handled => {}
    }
    consumed
}

fn request_text(session: &Rc<RefCell<Session>>, placeholder: String) {
    let callback = session.borrow().on_text_requested.clone();
    let answer = match callback {
        Some(callback) => callback.call1(&JsValue::NULL, &JsValue::from_str(&placeholder)),
        None => Ok(web_sys::window()
            .and_then(|w| w.prompt_with_message_and_default("Enter text:", &placeholder).ok())
            .flatten()
            .map_or(JsValue::NULL, |text| JsValue::from_str(&text))),
    };

    answer_later(session, answer, |s, value| {
        s.controller.submit_text(&s.chart, value.as_string());
    });
}

fn request_clear_confirmation(session: &Rc<RefCell<Session>>) {
    let callback = session.borrow().on_clear_requested.clone();
    let answer = match callback {
        Some(callback) => callback.call0(&JsValue::NULL),
        None => Ok(JsValue::from_bool(
            web_sys::window()
                .and_then(|w| w.confirm_with_message("Clear all drawings on this chart?").ok())
                .unwrap_or(false),
        )),
    };

    answer_later(session, answer, |s, value| {
        s.controller.confirm_clear(&s.chart, value.is_truthy());
    });
}

/// Feed a host answer back into the session, awaiting it first when it is
/// a Promise. A failed callback or rejected Promise answers `null`.
fn answer_later(
    session: &Rc<RefCell<Session>>,
    answer: Result<JsValue, JsValue>,
    apply: impl FnOnce(&mut Session, JsValue) + 'static,
) {
    let answer = answer.unwrap_or_else(|e| {
        get_logger().error(
            LogComponent::Api,
            &format!("❌ Host callback failed: {e:?}"),
        );
        JsValue::NULL
    });

    match answer.dyn_into::<Promise>() {
        Ok(promise) => {
            let session = Rc::clone(session);
            spawn_local(async move {
                let value = JsFuture::from(promise).await.unwrap_or(JsValue::NULL);
                run(&session, |s| apply(s, value));
            });
        }
        Err(value) => run(session, |s| apply(s, value)),
    }
}
