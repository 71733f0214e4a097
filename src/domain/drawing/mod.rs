//! Annotation aggregate: tools, annotations, Fibonacci tables, label
//! formatting and the durable storage interface.

pub mod entities;
pub mod fibonacci;
pub mod labels;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use fibonacci::*;
pub use labels::*;
pub use repositories::*;
pub use value_objects::*;
