//! Image normalization
//!
//! Signature captures usually arrive on an oversized transparent or white
//! canvas. Cropping to the ink keeps the stamped box tight to what was drawn.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;

use crate::error::PlacementError;

use super::ContentLoader;

/// Load an image for a bare anchor name and crop it to its ink
///
/// Returns PNG bytes.
pub fn resolve_image<L>(bare_name: &str, loader: &L) -> Result<Vec<u8>, PlacementError>
where
    L: ContentLoader + ?Sized,
{
    let raw = loader
        .load(bare_name)
        .map_err(|e| PlacementError::content(bare_name, e))?;
    normalize_image(&raw)
}

/// Crop encoded image bytes to their ink and re-encode them as PNG
///
/// An image without any ink is kept whole.
pub fn normalize_image(raw: &[u8]) -> Result<Vec<u8>, PlacementError> {
    let img = image::load_from_memory(raw)?;

    let cropped = match ink_bounds(&img.to_rgba8()) {
        Some((x, y, width, height)) => {
            debug!(
                "cropping {}x{} image to {}x{} at ({}, {})",
                img.width(),
                img.height(),
                width,
                height,
                x,
                y
            );
            img.crop_imm(x, y, width, height)
        }
        None => img,
    };

    encode_png(&cropped)
}

/// Tight bounding box `(x, y, width, height)` of the ink pixels
///
/// Ink is any pixel that is neither fully transparent nor pure white.
pub fn ink_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 || (r == 255 && g == 255 && b == 255) {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, PlacementError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::MapLoader;
    use image::{GenericImageView, Rgb, RgbImage, Rgba};

    fn png(img: DynamicImage) -> Vec<u8> {
        encode_png(&img).unwrap()
    }

    fn transparent_canvas_with_ink() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 0]));
        for x in 5..=8 {
            for y in 2..=6 {
                img.put_pixel(x, y, Rgba([0, 0, 128, 255]));
            }
        }
        img
    }

    #[test]
    fn test_ink_bounds_on_transparent_canvas() {
        assert_eq!(ink_bounds(&transparent_canvas_with_ink()), Some((5, 2, 4, 5)));
    }

    #[test]
    fn test_ink_bounds_ignores_white() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        img.put_pixel(3, 7, Rgb([0, 0, 0]));
        let rgba = DynamicImage::ImageRgb8(img).to_rgba8();
        assert_eq!(ink_bounds(&rgba), Some((3, 7, 1, 1)));
    }

    #[test]
    fn test_blank_image_has_no_ink() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        assert_eq!(ink_bounds(&img), None);
    }

    #[test]
    fn test_normalize_crops_to_ink() {
        let raw = png(DynamicImage::ImageRgba8(transparent_canvas_with_ink()));
        let normalized = normalize_image(&raw).unwrap();
        let decoded = image::load_from_memory(&normalized).unwrap();
        assert_eq!(decoded.dimensions(), (4, 5));
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0), &Rgba([0, 0, 128, 255]));
    }

    #[test]
    fn test_normalize_keeps_blank_image_whole() {
        let raw = png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            6,
            3,
            Rgba([0, 0, 0, 0]),
        )));
        let decoded = image::load_from_memory(&normalize_image(&raw).unwrap()).unwrap();
        assert_eq!(decoded.dimensions(), (6, 3));
    }

    #[test]
    fn test_resolve_image_rejects_garbage() {
        let loader = MapLoader::new().with_entry("signature__buyer", b"not an image".to_vec());
        let err = resolve_image("signature__buyer", &loader).unwrap_err();
        assert!(matches!(err, PlacementError::Image(_)));
    }

    #[test]
    fn test_resolve_image_missing_content() {
        let err = resolve_image("signature__buyer", &MapLoader::new()).unwrap_err();
        assert!(matches!(err, PlacementError::Content { .. }));
    }
}
