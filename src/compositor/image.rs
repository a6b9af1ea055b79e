//! Image XObject embedding

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::PlacementError;

/// An image already written into the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Add encoded image bytes to the document as an RGB image XObject
///
/// Alpha goes into a DeviceGray soft mask, omitted for fully opaque images.
pub(crate) fn embed_image(doc: &mut Document, encoded: &[u8]) -> Result<EmbeddedImage, PlacementError> {
    let img = image::load_from_memory(encoded)?.to_rgba8();
    let (width, height) = img.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in img.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if alpha.iter().any(|&a| a != u8::MAX) {
        let smask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        ));
        image_dict.set("SMask", Object::Reference(smask_id));
    }

    let id = doc.add_object(Stream::new(image_dict, deflate(&rgb)?));
    Ok(EmbeddedImage { id, width, height })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, PlacementError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
