pub mod annotation_store;
pub mod config;
pub mod controller;
pub mod draw_ops;
pub mod hit_test;
pub mod renderer;

pub use annotation_store::*;
pub use config::*;
pub use controller::*;
pub use draw_ops::*;
pub use hit_test::*;
pub use renderer::*;
