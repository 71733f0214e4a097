pub mod rendering;
pub mod services;
pub mod storage;

pub use rendering::CanvasRenderer;
pub use services::{BrowserClock, ConsoleLogger};
pub use storage::{BrowserLocalStorage, InMemoryStorage};
