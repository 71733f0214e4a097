use serde::Deserialize;

use crate::domain::chart::{ChartMargins, Color};
use crate::domain::drawing::{
    AnnotationStyle, DEFAULT_DRAWING_COLOR, DEFAULT_LINE_WIDTH, HIGHLIGHT_DRAWING_COLOR,
};
use crate::domain::errors::DrawingResult;

/// localStorage entry holding every saved drawing.
pub const DEFAULT_STORAGE_KEY: &str = "omar_terminal_drawings";

/// Tunables of the drawing layer. Every field has a default, so a host may
/// pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawingConfig {
    pub margins: ChartMargins,
    pub default_color: Color,
    pub highlight_color: Color,
    pub line_width: f64,
    pub storage_key: String,
    pub text_placeholder: String,
    /// Max distance in pixels for a click to select a drawing.
    pub hit_tolerance_px: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            margins: ChartMargins::default(),
            default_color: Color::from_hex(DEFAULT_DRAWING_COLOR),
            highlight_color: Color::from_hex(HIGHLIGHT_DRAWING_COLOR),
            line_width: DEFAULT_LINE_WIDTH,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            text_placeholder: "Text".to_string(),
            hit_tolerance_px: 6.0,
        }
    }
}

impl DrawingConfig {
    pub fn from_json(json: &str) -> DrawingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Style given to newly created drawings.
    pub fn annotation_style(&self) -> AnnotationStyle {
        AnnotationStyle { color: self.default_color, line_width: self.line_width }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r##"{"highlightColor":"#00ff00","margins":{"right":60,"bottom":24}}"##;
        let config = DrawingConfig::from_json(json).unwrap();
        assert_eq!(config.highlight_color.to_hex(), 0x00ff00);
        assert_eq!(config.margins, ChartMargins { right: 60.0, bottom: 24.0 });
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.line_width, 2.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(DrawingConfig::from_json("{\"lineWidth\": \"wide\"}").is_err());
    }
}
