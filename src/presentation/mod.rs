pub mod host_chart;
pub mod toolbar;
pub mod wasm_api;

pub use host_chart::{CandleDto, HostChart};
pub use toolbar::DrawingToolbar;
pub use wasm_api::DrawingToolsApi;
