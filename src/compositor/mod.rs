//! Page compositor
//!
//! Writes prepared images and text into pages of a PDF document. Callers work
//! in top-left page coordinates; conversion to PDF user space happens here.

pub mod config;
mod image;
mod text;

pub use config::TextStyle;

use std::collections::{HashMap, HashSet};

use log::debug;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::PlacementError;
use crate::geometry::{check_placement, Rect};

use self::image::{embed_image, EmbeddedImage};
use self::text::{num, text_operators};

/// US Letter, used when a page has no usable MediaBox
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

const FONT_RESOURCE: &str = "SHF1";

/// A paginated document that artifacts can be stamped into
pub trait PageSurface {
    /// Number of pages
    fn page_count(&self) -> usize;

    /// Composite encoded image bytes into `rect` on `page`
    fn insert_image(&mut self, page: usize, rect: Rect, image: &[u8]) -> Result<(), PlacementError>;

    /// Lay out `text` inside `rect` on `page`
    fn insert_text(&mut self, page: usize, rect: Rect, text: &str) -> Result<(), PlacementError>;
}

/// Check the placement, then composite an image
///
/// Nothing is written when the page index or rectangle origin is negative.
pub fn add_image<S>(surface: &mut S, page: i64, rect: Rect, image: &[u8]) -> Result<(), PlacementError>
where
    S: PageSurface + ?Sized,
{
    let page = checked_page(surface, page, rect)?;
    surface.insert_image(page, rect, image)
}

/// Check the placement, then lay out text
///
/// Nothing is written when the page index or rectangle origin is negative.
pub fn add_text<S>(surface: &mut S, page: i64, rect: Rect, text: &str) -> Result<(), PlacementError>
where
    S: PageSurface + ?Sized,
{
    let page = checked_page(surface, page, rect)?;
    surface.insert_text(page, rect, text)
}

fn checked_page<S>(surface: &S, page: i64, rect: Rect) -> Result<usize, PlacementError>
where
    S: PageSurface + ?Sized,
{
    check_placement(page, rect.x0, rect.y0)?;
    let page = page as usize;
    let page_count = surface.page_count();
    if page >= page_count {
        return Err(PlacementError::PageOutOfRange { page, page_count });
    }
    Ok(page)
}

/// A PDF document backed by `lopdf`
#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    style: TextStyle,
    /// Pages whose original content is already isolated in `q`/`Q`
    normalized: HashSet<ObjectId>,
    images: HashMap<Vec<u8>, EmbeddedImage>,
    font: Option<ObjectId>,
}

impl PdfDocument {
    /// Parse a document from bytes
    pub fn load(bytes: &[u8]) -> Result<Self, PlacementError> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    /// Wrap an already parsed document
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            style: TextStyle::default(),
            normalized: HashSet::new(),
            images: HashMap::new(),
            font: None,
        }
    }

    /// Set the style used for text
    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.style
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Serialize the document
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, PlacementError> {
        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }

    /// Page box `[llx, lly, urx, ury]`, inherited from parent nodes if needed
    pub fn media_box(&self, page: usize) -> Result<[f64; 4], PlacementError> {
        let mut current = Some(self.page_id(page)?);
        while let Some(id) = current {
            let dict = self.doc.get_object(id)?.as_dict()?;
            if let Some(media_box) = self.read_media_box(dict) {
                return Ok(media_box);
            }
            current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
        }
        Ok(DEFAULT_MEDIA_BOX)
    }

    fn read_media_box(&self, dict: &Dictionary) -> Option<[f64; 4]> {
        let raw = dict.get(b"MediaBox").ok()?;
        let resolved = match raw {
            Object::Reference(id) => self.doc.get_object(*id).ok()?,
            other => other,
        };
        let values: Vec<f64> = resolved
            .as_array()
            .ok()?
            .iter()
            .filter_map(|o| match o {
                Object::Integer(i) => Some(*i as f64),
                Object::Real(f) => Some(f64::from(*f)),
                _ => None,
            })
            .collect();
        match values.as_slice() {
            [llx, lly, urx, ury] => Some([*llx, *lly, *urx, *ury]),
            _ => None,
        }
    }

    fn page_id(&self, page: usize) -> Result<ObjectId, PlacementError> {
        self.pages
            .get(page)
            .copied()
            .ok_or(PlacementError::PageOutOfRange {
                page,
                page_count: self.pages.len(),
            })
    }

    /// Isolate the page's existing content so its graphics state cannot leak
    fn normalize_page(&mut self, page_id: ObjectId) -> Result<(), PlacementError> {
        if !self.normalized.insert(page_id) {
            return Ok(());
        }
        let existing = self.doc.get_object_mut(page_id)?.as_dict_mut()?.remove(b"Contents");
        let Some(existing) = existing else {
            return Ok(());
        };

        let open = self.doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let close = self.doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));

        let mut contents = vec![Object::Reference(open)];
        contents.extend(self.content_refs(existing));
        contents.push(Object::Reference(close));
        self.doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Flatten a `Contents` value into a list of stream references
    fn content_refs(&self, contents: Object) -> Vec<Object> {
        match contents {
            Object::Array(items) => items,
            Object::Reference(id) => match self.doc.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            other => vec![other],
        }
    }

    fn append_content(&mut self, page_id: ObjectId, content: Vec<u8>) -> Result<(), PlacementError> {
        self.normalize_page(page_id)?;
        let stream_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let existing = self.doc.get_object_mut(page_id)?.as_dict_mut()?.remove(b"Contents");
        let mut contents = existing.map(|c| self.content_refs(c)).unwrap_or_default();
        contents.push(Object::Reference(stream_id));
        self.doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// The page's own resource dictionary, created from inherited resources if missing
    fn resources_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, PlacementError> {
        let shared = match self.doc.get_object(page_id)?.as_dict()?.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => {
                let inherited = self.inherited_resources(page_id)?;
                self.doc
                    .get_object_mut(page_id)?
                    .as_dict_mut()?
                    .set("Resources", Object::Dictionary(inherited));
                None
            }
        };

        let resources = match shared {
            Some(id) => self.doc.get_object_mut(id)?.as_dict_mut()?,
            None => self
                .doc
                .get_object_mut(page_id)?
                .as_dict_mut()?
                .get_mut(b"Resources")?
                .as_dict_mut()?,
        };
        Ok(resources)
    }

    fn inherited_resources(&self, page_id: ObjectId) -> Result<Dictionary, PlacementError> {
        let mut current = self
            .doc
            .get_object(page_id)?
            .as_dict()?
            .get(b"Parent")
            .and_then(|p| p.as_reference())
            .ok();
        while let Some(id) = current {
            let dict = self.doc.get_object(id)?.as_dict()?;
            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(self.resolve_dict(resources));
            }
            current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
        }
        Ok(Dictionary::new())
    }

    fn resolve_dict(&self, object: &Object) -> Dictionary {
        match object {
            Object::Dictionary(dict) => dict.clone(),
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .and_then(|o| o.as_dict())
                .cloned()
                .unwrap_or_default(),
            _ => Dictionary::new(),
        }
    }

    /// Register `target` under `name` in the page's `kind` resources (`XObject`, `Font`)
    fn add_resource(
        &mut self,
        page_id: ObjectId,
        kind: &str,
        name: &str,
        target: ObjectId,
    ) -> Result<(), PlacementError> {
        let current = self
            .resources_mut(page_id)?
            .get(kind.as_bytes())
            .ok()
            .cloned();
        let mut entries = current.map(|c| self.resolve_dict(&c)).unwrap_or_default();
        entries.set(name, Object::Reference(target));
        self.resources_mut(page_id)?
            .set(kind, Object::Dictionary(entries));
        Ok(())
    }

    fn font_id(&mut self) -> ObjectId {
        if let Some(id) = self.font {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(self.style.font.clone().into_bytes()),
            "Encoding" => "WinAnsiEncoding",
        });
        self.font = Some(id);
        id
    }

    fn embedded(&mut self, image: &[u8]) -> Result<EmbeddedImage, PlacementError> {
        if let Some(embedded) = self.images.get(image) {
            return Ok(*embedded);
        }
        let embedded = embed_image(&mut self.doc, image)?;
        self.images.insert(image.to_vec(), embedded);
        Ok(embedded)
    }
}

impl PageSurface for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn insert_image(&mut self, page: usize, rect: Rect, image: &[u8]) -> Result<(), PlacementError> {
        let page_id = self.page_id(page)?;
        let [llx, _, _, ury] = self.media_box(page)?;
        let embedded = self.embedded(image)?;

        let name = format!("SHIm{}", embedded.id.0);
        self.add_resource(page_id, "XObject", &name, embedded.id)?;

        let target = rect.fit_centered(embedded.width as f64, embedded.height as f64);
        debug!("placing image {} on page {} at {:?}", name, page, target);
        let ops = format!(
            "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
            num(target.width()),
            num(target.height()),
            num(llx + target.x0),
            num(ury - target.y1),
            name
        );
        self.append_content(page_id, ops.into_bytes())
    }

    fn insert_text(&mut self, page: usize, rect: Rect, text: &str) -> Result<(), PlacementError> {
        let page_id = self.page_id(page)?;
        let [llx, _, _, ury] = self.media_box(page)?;

        let font_id = self.font_id();
        self.add_resource(page_id, "Font", FONT_RESOURCE, font_id)?;

        debug!("placing text on page {} at {:?}", page, rect);
        let ops = text_operators(
            text,
            FONT_RESOURCE,
            &self.style,
            llx + rect.x0,
            ury - rect.y0,
            rect.width(),
            rect.height(),
        );
        self.append_content(page_id, ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A document with `count` empty letter-sized pages
    fn blank_document(count: usize) -> PdfDocument {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..count)
            .map(|_| {
                let content = doc.add_object(Stream::new(dictionary! {}, b"1 0 0 rg".to_vec()));
                Object::Reference(doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content,
                }))
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count as i64,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! {},
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);
        PdfDocument::from_document(doc)
    }

    fn page_content(doc: &PdfDocument, page: usize) -> String {
        let id = doc.page_id(page).unwrap();
        String::from_utf8(doc.document().get_page_content(id).unwrap()).unwrap()
    }

    #[test]
    fn test_media_box_is_inherited() {
        let doc = blank_document(1);
        assert_eq!(doc.media_box(0).unwrap(), [0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn test_insert_text_writes_operators() {
        let mut doc = blank_document(2);
        doc.insert_text(1, Rect::new(10.0, 20.0, 510.0, 120.0), "Alice")
            .unwrap();

        let content = page_content(&doc, 1);
        assert!(content.starts_with("q\n1 0 0 rg\nQ\n"), "{}", content);
        assert!(content.contains("10 761 Td"));
        assert!(content.contains("(Alice) Tj"));
        assert_eq!(page_content(&doc, 0), "1 0 0 rg");
    }

    #[test]
    fn test_existing_content_is_isolated_once() {
        let mut doc = blank_document(1);
        let rect = Rect::new(0.0, 0.0, 500.0, 100.0);
        doc.insert_text(0, rect, "one").unwrap();
        doc.insert_text(0, rect, "two").unwrap();

        let content = page_content(&doc, 0);
        assert_eq!(content.matches("\nQ\n").count(), 3);
        assert!(content.find("(one)").unwrap() < content.find("(two)").unwrap());
    }

    #[test]
    fn test_insert_text_registers_font_on_page() {
        let mut doc = blank_document(1);
        doc.insert_text(0, Rect::new(0.0, 0.0, 500.0, 100.0), "x")
            .unwrap();

        let page_id = doc.page_id(0).unwrap();
        let page = doc.document().get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(FONT_RESOURCE.as_bytes()));
    }

    #[test]
    fn test_checked_helpers_reject_before_writing() {
        let mut doc = blank_document(1);
        let before = page_content(&doc, 0);

        let err = add_text(&mut doc, -1, Rect::new(0.0, 0.0, 1.0, 1.0), "x").unwrap_err();
        assert!(err.is_invalid_input());
        let err = add_text(&mut doc, 0, Rect::new(-5.0, 0.0, 1.0, 1.0), "x").unwrap_err();
        assert!(err.is_invalid_input());
        let err = add_image(&mut doc, 3, Rect::new(0.0, 0.0, 1.0, 1.0), b"").unwrap_err();
        assert!(matches!(err, PlacementError::PageOutOfRange { page: 3, page_count: 1 }));

        assert_eq!(page_content(&doc, 0), before);
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut doc = blank_document(3);
        let bytes = doc.to_bytes().unwrap();
        let reloaded = PdfDocument::load(&bytes).unwrap();
        assert_eq!(reloaded.page_count(), 3);
    }
}
