//! Placement geometry
//!
//! Page coordinates have their origin at the top-left corner of the page with
//! y growing downward, in PDF points.

use crate::error::PlacementError;
use crate::settings::Settings;

/// A 2D point in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned rectangle given by two corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle with its top-left corner at `origin`
    pub fn from_origin(origin: Point, width: f64, height: f64) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// Largest rectangle with the given aspect ratio that fits inside this one, centered
    pub fn fit_centered(&self, content_width: f64, content_height: f64) -> Rect {
        if content_width <= 0.0 || content_height <= 0.0 {
            return *self;
        }
        let scale = (self.width() / content_width).min(self.height() / content_height);
        let width = content_width * scale;
        let height = content_height * scale;
        let x0 = self.x0 + (self.width() - width) / 2.0;
        let y0 = self.y0 + (self.height() - height) / 2.0;
        Rect::new(x0, y0, x0 + width, y0 + height)
    }
}

/// Scale and offset a raw anchor coordinate
pub fn position(raw: Point, settings: &Settings) -> Point {
    Point::new(
        raw.x * settings.x_scalar + settings.x_offset,
        raw.y * settings.y_scalar + settings.y_offset,
    )
}

/// Placement rectangle for a raw anchor coordinate
pub fn rectangle(raw: Point, settings: &Settings, width: f64, height: f64) -> Rect {
    Rect::from_origin(position(raw, settings), width, height)
}

/// Placement rectangle for an image, sized by the settings' box
pub fn image_rectangle(raw: Point, settings: &Settings) -> Rect {
    rectangle(raw, settings, settings.max_x, settings.max_y)
}

/// Reject negative page indexes and coordinates
///
/// NaN and infinite coordinates are rejected too.
pub fn check_placement(page: i64, x: f64, y: f64) -> Result<(), PlacementError> {
    if page < 0 {
        return Err(PlacementError::invalid_placement(format!(
            "page must be a zero-indexed non-negative integer, got {}",
            page
        )));
    }
    if !(x.is_finite() && y.is_finite() && x >= 0.0 && y >= 0.0) {
        return Err(PlacementError::invalid_placement(format!(
            "page coordinates must be finite and non-negative, got ({}, {})",
            x, y
        )));
    }
    Ok(())
}

/// Check a whole placement rectangle: a valid origin and a finite far corner
pub fn check_rect(page: i64, rect: Rect) -> Result<(), PlacementError> {
    check_placement(page, rect.x0, rect.y0)?;
    if !(rect.x1.is_finite() && rect.y1.is_finite()) {
        return Err(PlacementError::invalid_placement(format!(
            "placement box must be finite, got corner ({}, {})",
            rect.x1, rect.y1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_rectangle_scales_then_offsets() {
        let settings = Settings {
            x_offset: -10.0,
            y_offset: 5.0,
            max_x: 40.0,
            max_y: 20.0,
            x_scalar: 0.5,
            y_scalar: 2.0,
        };
        let rect = image_rectangle(Point::new(100.0, 50.0), &settings);
        assert_eq!(rect, Rect::new(40.0, 105.0, 80.0, 125.0));
    }

    #[test]
    fn test_text_box_ignores_settings_box() {
        let settings = Settings {
            x_offset: 2.0,
            max_x: 40.0,
            max_y: 20.0,
            ..Settings::default()
        };
        let rect = rectangle(Point::new(10.0, 10.0), &settings, 500.0, 100.0);
        assert_eq!(rect, Rect::new(12.0, 10.0, 512.0, 110.0));
    }

    #[test]
    fn test_valid_placements_pass() {
        for (page, x, y) in [(0, 0.0, 0.0), (3, 10.5, 0.0), (64, 612.0, 792.0)] {
            assert!(check_placement(page, x, y).is_ok());
        }
    }

    #[test]
    fn test_any_negative_value_fails() {
        let invalid = [(-1, 0.0, 0.0), (0, -1.0, 0.0), (0, 0.0, -1.0), (-1, -1.0, -1.0)];
        for (page, x, y) in invalid {
            let err = check_placement(page, x, y).unwrap_err();
            assert!(err.is_invalid_input(), "{:?}", (page, x, y));
        }
    }

    #[test]
    fn test_nan_coordinate_fails() {
        assert!(check_placement(0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_infinite_coordinate_fails() {
        for (x, y) in [(f64::INFINITY, 10.0), (0.0, f64::INFINITY), (f64::NEG_INFINITY, 0.0)] {
            let err = check_placement(0, x, y).unwrap_err();
            assert!(err.is_invalid_input(), "{:?}", (x, y));
        }
    }

    #[test]
    fn test_check_rect_rejects_infinite_far_corner() {
        assert!(check_rect(0, Rect::new(0.0, 0.0, 40.0, 20.0)).is_ok());
        let err = check_rect(0, Rect::new(0.0, 0.0, f64::INFINITY, 20.0)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_fit_centered_keeps_aspect_ratio() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        // a square image is limited by the height
        assert_eq!(rect.fit_centered(10.0, 10.0), Rect::new(25.0, 0.0, 75.0, 50.0));
        // a wide image is limited by the width
        assert_eq!(rect.fit_centered(40.0, 10.0), Rect::new(0.0, 12.5, 100.0, 37.5));
    }
}
