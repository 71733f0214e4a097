pub mod chart;
pub mod drawing;
pub mod errors;
pub mod logging;
pub mod market_data;
