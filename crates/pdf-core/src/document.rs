//! PDF Document wrapper

use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_label_operators, TextLabel, LABEL_BASE_FONT, LABEL_FONT_RESOURCE};
use crate::{is_pdf, PageSize, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Parent chain depth limit when resolving inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 10;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF Document wrapper for overlaying signatures onto existing pages
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Embedded images (data hash -> image XObject ID)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> resource name -> object ID)
    page_image_resources: HashMap<usize, HashMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Helvetica font object, created on first label
    label_font: Option<ObjectId>,
    /// Pages whose resources already reference the label font
    label_font_pages: HashSet<usize>,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    fn wrap(inner: Document) -> Self {
        Self {
            inner,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            label_font: None,
            label_font_pages: HashSet::new(),
            page_content_buffer: BTreeMap::new(),
        }
    }

    /// Open a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::wrap(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::wrap(inner))
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        if page == 0 || page > pages.len() {
            return Err(PdfError::InvalidPage(page, pages.len()));
        }
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get the size of a page in points
    ///
    /// Reads MediaBox (or CropBox), following the Pages tree for inherited
    /// values. Pages without any box are treated as US Letter.
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        match self.inherited_attribute(page_id, &[&b"MediaBox"[..], &b"CropBox"[..]])? {
            Some(obj) => {
                let rect = self.resolve(obj)?.as_array().map_err(|_| {
                    PdfError::ParseError("MediaBox is not an array".to_string())
                })?;
                rect_size(rect)
            }
            None => {
                log::debug!("page {page} has no MediaBox, assuming letter size");
                Ok(PageSize::LETTER)
            }
        }
    }

    /// Size of the first page, or letter size for an empty document
    pub fn first_page_size(&self) -> PageSize {
        if self.page_count() == 0 {
            return PageSize::LETTER;
        }
        self.page_size(1).unwrap_or(PageSize::LETTER)
    }

    /// Whether any page declares XObject resources
    pub fn has_images(&self) -> bool {
        self.inner.get_pages().values().any(|&page_id| {
            self.page_resources(page_id)
                .map(|res| res.get(b"XObject").is_ok())
                .unwrap_or(false)
        })
    }

    /// Extract text per page, keyed by 1-indexed page number
    ///
    /// Lines are trimmed, blank lines dropped; pages with no text are omitted.
    pub fn extract_page_texts(&self) -> BTreeMap<usize, String> {
        let mut texts = BTreeMap::new();
        for &number in self.inner.get_pages().keys() {
            let raw = match self.inner.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("text extraction failed on page {number}: {e}");
                    continue;
                }
            };
            let cleaned = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !cleaned.is_empty() {
                texts.insert(number as usize, cleaned);
            }
        }
        texts
    }

    /// Draw an image into a box whose bottom-left corner is at `x`/`y`
    ///
    /// Coordinates and sizes are in points, PDF coordinate system.
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.page_id(page)?;
        let resource_name = self.get_or_create_image_ref(data, page)?;
        let operators = generate_image_operators(&resource_name, x, y, width, height);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Draw a label in Helvetica with its baseline starting at `x`/`y`
    pub fn insert_label(&mut self, text: &str, page: usize, x: f64, y: f64, size: f64) -> Result<()> {
        self.insert_text_label(&TextLabel::new(text, size), page, x, y)
    }

    /// Draw a fully specified label
    pub fn insert_text_label(&mut self, label: &TextLabel, page: usize, x: f64, y: f64) -> Result<()> {
        self.page_id(page)?;
        if label.text.is_empty() {
            return Ok(());
        }
        self.ensure_label_font(page)?;
        let operators = generate_label_operators(label, x, y);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        if !is_pdf(&buffer) {
            return Err(PdfError::SaveError(
                "output does not start with %PDF".to_string(),
            ));
        }
        Ok(buffer)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Look up the first of `keys` on the page or its ancestors
    fn inherited_attribute(&self, page_id: ObjectId, keys: &[&[u8]]) -> Result<Option<&Object>> {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self
                .inner
                .get_object(current)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Some(found) = keys.iter().find_map(|key| dict.get(key).ok()) {
                return Ok(Some(found));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => break,
            }
        }
        Ok(None)
    }

    /// Effective Resources dictionary for a page (own or inherited), cloned
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.inherited_attribute(page_id, &[&b"Resources"[..]])? {
            Some(obj) => Ok(self
                .resolve(obj)?
                .as_dict()
                .map(Dictionary::clone)
                .unwrap_or_else(|_| Dictionary::new())),
            None => Ok(Dictionary::new()),
        }
    }

    /// Set `name` -> `value` inside the page's `category` resource dictionary
    ///
    /// The effective Resources are copied onto the page itself so inherited or
    /// shared resource dictionaries are never modified in place.
    fn set_page_resource(
        &mut self,
        page: usize,
        category: &[u8],
        name: &str,
        value: Object,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut resources = self.page_resources(page_id)?;

        let mut entries = match resources.get(category) {
            Ok(obj) => self
                .resolve(obj)?
                .as_dict()
                .map(Dictionary::clone)
                .unwrap_or_else(|_| Dictionary::new()),
            Err(_) => Dictionary::new(),
        };
        entries.set(name.as_bytes(), value);
        resources.set(category, Object::Dictionary(entries));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set(b"Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page_dict.into());
        Ok(())
    }

    /// Get or create an image resource for a page, returning its name
    ///
    /// Images are embedded once per distinct content and shared across pages.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash) {
            Some(id) => *id,
            None => {
                let xobject = ImageXObject::from_bytes(data)?;
                let mask_id = xobject
                    .soft_mask_stream()
                    .map(|mask| self.inner.add_object(mask));
                let id = self.inner.add_object(xobject.to_pdf_stream(mask_id));
                self.embedded_images.insert(data_hash, id);
                id
            }
        };

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|res| res.iter().find(|(_, id)| **id == object_id))
            .map(|(name, _)| name.clone())
        {
            return Ok(name);
        }

        let resource_name = format!("ImSig{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.set_page_resource(page, b"XObject", &resource_name, Object::Reference(object_id))?;
        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(resource_name.clone(), object_id);

        Ok(resource_name)
    }

    fn ensure_label_font(&mut self, page: usize) -> Result<()> {
        let font_id = match self.label_font {
            Some(id) => id,
            None => {
                let mut font = Dictionary::new();
                font.set("Type", Object::Name(b"Font".to_vec()));
                font.set("Subtype", Object::Name(b"Type1".to_vec()));
                font.set("BaseFont", Object::Name(LABEL_BASE_FONT.as_bytes().to_vec()));
                font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                let id = self.inner.add_object(font);
                self.label_font = Some(id);
                id
            }
        };

        if self.label_font_pages.insert(page) {
            self.set_page_resource(page, b"Font", LABEL_FONT_RESOURCE, Object::Reference(font_id))?;
        }
        Ok(())
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Write buffered operators into one new content stream per page
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);
        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }
        Ok(())
    }

    /// Append operators after the page's existing content
    ///
    /// The existing content is wrapped in q/Q so any transformation it leaves
    /// behind does not shift the overlay.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let existing = self.inner.get_page_content(page_id).unwrap_or_default();

        let mut merged = Vec::with_capacity(existing.len() + content.len() + 8);
        if !existing.is_empty() {
            merged.extend_from_slice(b"q\n");
            merged.extend_from_slice(&existing);
            merged.extend_from_slice(b"\nQ\n");
        }
        merged.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), merged));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, page_dict.into());
        Ok(())
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Width/height of a `[llx lly urx ury]` rectangle
fn rect_size(rect: &[Object]) -> Result<PageSize> {
    if rect.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }
    let coords = rect[..4]
        .iter()
        .map(number)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| PdfError::ParseError("Invalid MediaBox value".to_string()))?;
    Ok(PageSize::new(
        (coords[2] - coords[0]).abs(),
        (coords[3] - coords[1]).abs(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_size_integers_and_reals() {
        let rect = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.5),
            Object::Integer(842),
        ];
        let size = rect_size(&rect).unwrap();
        assert_eq!(size.width, 595.5);
        assert_eq!(size.height, 842.0);
    }

    #[test]
    fn test_rect_size_offset_origin() {
        let rect = vec![
            Object::Integer(10),
            Object::Integer(20),
            Object::Integer(622),
            Object::Integer(812),
        ];
        assert_eq!(rect_size(&rect).unwrap(), PageSize::new(612.0, 792.0));
    }

    #[test]
    fn test_rect_size_invalid() {
        assert!(rect_size(&[Object::Integer(0)]).is_err());
        let bad = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Name(b"x".to_vec()),
            Object::Integer(1),
        ];
        assert!(rect_size(&bad).is_err());
    }

    #[test]
    fn test_color_default_black() {
        assert_eq!(Color::default(), Color::rgb(0.0, 0.0, 0.0));
    }
}
