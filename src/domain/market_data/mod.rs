//! Market data consumed from the chart engine: candles and the identifiers
//! that select a series.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
