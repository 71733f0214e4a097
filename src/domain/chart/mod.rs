//! Chart geometry: the pan/zoom state read from the chart engine and the
//! coordinate transform between canvas pixels and (price, candle index).

pub mod repositories;
pub mod value_objects;
pub mod viewport;

pub use repositories::*;
pub use value_objects::*;
pub use viewport::*;
