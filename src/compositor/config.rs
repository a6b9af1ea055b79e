//! Configuration for text stamping

/// Font and box settings for dynamic text
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Standard Type1 font name
    pub font: String,

    /// Font size in points
    pub font_size: f64,

    /// Distance between baselines as a multiple of the font size
    pub line_height: f64,

    /// Layout box size (width, height); text does not use the image box settings
    pub box_size: (f64, f64),
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "Times-Roman".to_string(),
            font_size: 11.0,
            line_height: 1.2,
            box_size: (500.0, 100.0),
        }
    }
}

impl TextStyle {
    /// Create a new style with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font name
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Set the font size
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the line height multiplier
    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    /// Set the layout box size
    pub fn with_box_size(mut self, width: f64, height: f64) -> Self {
        self.box_size = (width, height);
        self
    }

    /// Distance between baselines in points
    pub fn leading(&self) -> f64 {
        self.font_size * self.line_height
    }
}
