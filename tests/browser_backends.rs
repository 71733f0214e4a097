#![cfg(target_arch = "wasm32")]

use chart_drawing_tools::application::{
    AnnotationStore, DrawOp, LABEL_FONT, StrokeStyle, TextMeasurer,
};
use chart_drawing_tools::domain::chart::{Color, DomainPoint, PixelPoint, PixelRect};
use chart_drawing_tools::domain::drawing::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStyle, ChartKey, KeyValueStorage,
};
use chart_drawing_tools::domain::market_data::{Symbol, TimeInterval};
use chart_drawing_tools::infrastructure::{BrowserLocalStorage, CanvasRenderer};
use chart_drawing_tools::presentation::wasm_api::pointer_position;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const TEST_KEY: &str = "chart_drawing_tools_test";

fn context() -> CanvasRenderingContext2d {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement =
        document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(400);
    canvas.set_height(200);
    canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let mut storage = BrowserLocalStorage::new().unwrap();
    storage.set_item(TEST_KEY, "{}").unwrap();
    assert_eq!(storage.get_item(TEST_KEY).unwrap().as_deref(), Some("{}"));
}

#[wasm_bindgen_test]
fn store_survives_a_reload() {
    let key = ChartKey::new(Symbol::from("BTCUSDT"), TimeInterval::FiveMinutes);
    let mut store = AnnotationStore::new(BrowserLocalStorage::new().unwrap(), TEST_KEY);
    store.clear(&key);
    store.append(
        &key,
        Annotation::new(
            AnnotationId::new("browser"),
            AnnotationKind::Rectangle,
            DomainPoint::new(100.0, 1, 0),
            DomainPoint::new(90.0, 3, 0),
            AnnotationStyle::default(),
            0,
        ),
    );

    let reopened = AnnotationStore::open(BrowserLocalStorage::new().unwrap(), TEST_KEY);
    assert_eq!(reopened.get(&key).len(), 1);
}

#[wasm_bindgen_test]
fn canvas_replays_ops_and_restores_state() {
    let ctx = context();
    let renderer = CanvasRenderer::new(ctx.clone());
    let orange = Color::from_hex(0xff8c00);

    let ops = vec![
        DrawOp::Line {
            from: PixelPoint::new(0.0, 10.0),
            to: PixelPoint::new(300.0, 10.0),
            stroke: StrokeStyle::solid(orange, 2.0).dashed(5.0, 5.0).with_opacity(0.5),
        },
        DrawOp::FillRect { rect: PixelRect::new(10.0, 20.0, 30.0, 40.0), color: orange },
        DrawOp::FillCircle { center: PixelPoint::new(50.0, 50.0), radius: 4.0, color: orange },
        DrawOp::text("64250.50", PixelPoint::new(304.0, 13.0), LABEL_FONT, Color::BLACK),
    ];
    renderer.draw_all(&ops).unwrap();

    assert_eq!(ctx.global_alpha(), 1.0);
    assert_eq!(ctx.get_line_dash().length(), 0);
}

#[wasm_bindgen_test]
fn canvas_measures_text() {
    let renderer = CanvasRenderer::new(context());
    assert!(renderer.text_width("Breakout", LABEL_FONT) > 0.0);
    assert_eq!(renderer.text_width("", LABEL_FONT), 0.0);
}

#[wasm_bindgen_test]
fn pointer_is_measured_from_the_chart_body() {
    let document = web_sys::window().unwrap().document().unwrap();
    let body: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    body.style().set_css_text("position:absolute;left:40px;top:20px;width:400px;height:200px");
    let inset: HtmlElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    inset.style().set_css_text("position:absolute;left:80px;top:0");
    body.append_child(&inset).unwrap();
    document.body().unwrap().append_child(&body).unwrap();

    // 5px into the inset canvas is 85px into the chart body
    let at = pointer_position(&body, 40.0 + 85.0, 20.0 + 10.0);
    assert_eq!(at, PixelPoint::new(85.0, 10.0));

    body.remove();
}
