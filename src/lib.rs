//! Chart drawing tools: horizontal lines, trend lines, Fibonacci
//! retracement/extension, rectangles, rulers and text labels drawn over a
//! candlestick chart, anchored in (price, candle index) so they follow pan
//! and zoom, and saved per instrument/timeframe in localStorage.

use wasm_bindgen::prelude::*;

use crate::domain::logging::{LogComponent, get_logger};

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

/// Install the panic hook, console logger and browser clock.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = if cfg!(debug_assertions) {
        infrastructure::ConsoleLogger::new_development()
    } else {
        infrastructure::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(console_logger));
    domain::logging::init_clock(Box::new(infrastructure::BrowserClock));

    get_logger().info(LogComponent::Api, "🚀 Drawing tools initialized");
}
