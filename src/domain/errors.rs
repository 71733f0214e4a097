use derive_more::Display;

/// Durable key-value storage failures (quota, privacy mode, missing API).
#[derive(Debug, Clone, PartialEq, Display)]
pub enum StorageError {
    #[display(fmt = "storage unavailable: {}", _0)]
    Unavailable(String),
    #[display(fmt = "storage read failed: {}", _0)]
    Read(String),
    #[display(fmt = "storage write failed: {}", _0)]
    Write(String),
}

impl std::error::Error for StorageError {}

/// Root error of the drawing-tools crate.
///
/// Nothing in the interaction flow propagates these to the host: the store
/// logs and degrades, the renderer skips. They surface only at the wasm
/// boundary for malformed host input.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum DrawingError {
    #[display(fmt = "Storage Error: {}", _0)]
    Storage(StorageError),
    #[display(fmt = "Serialization Error: {}", _0)]
    Serialization(String),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(String),
    #[display(fmt = "Invalid Input: {}", _0)]
    InvalidInput(String),
}

impl std::error::Error for DrawingError {}

impl From<StorageError> for DrawingError {
    fn from(error: StorageError) -> Self {
        DrawingError::Storage(error)
    }
}

impl From<serde_json::Error> for DrawingError {
    fn from(error: serde_json::Error) -> Self {
        DrawingError::Serialization(error.to_string())
    }
}

impl From<DrawingError> for wasm_bindgen::JsValue {
    fn from(error: DrawingError) -> Self {
        wasm_bindgen::JsValue::from_str(&error.to_string())
    }
}

pub type DrawingResult<T> = Result<T, DrawingError>;
