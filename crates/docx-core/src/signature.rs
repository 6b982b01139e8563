//! Signature paragraphs and footers

use crate::content_types::{ensure_default, ensure_override, FOOTER_CONTENT_TYPE};
use crate::package::DocxPackage;
use crate::relationships::{resolve_target, FOOTER_RELATIONSHIP, IMAGE_RELATIONSHIP};
use crate::xml::{find_elements, open_tag_of_empty, splice, ElementSpan};
use crate::{Alignment, DocxError, Result, CONTENT_TYPES_PART, DOCUMENT_PART, EMU_PER_INCH};
use image::ImageReader;
use quick_xml::escape::escape;
use std::io::Cursor;

/// Bold label run placed before every signature picture
pub const SIGNATURE_LABEL: &str = "Signature";

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// A signature image ready to embed
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureImage {
    pub data: Vec<u8>,
    /// File extension used for the media part (`png` or `jpeg`)
    pub extension: &'static str,
    pub width_px: u32,
    pub height_px: u32,
}

impl SignatureImage {
    /// Detect the format and pixel size of PNG or JPEG data
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        let data = data.into();
        let format =
            image::guess_format(&data).map_err(|e| DocxError::ImageError(e.to_string()))?;
        let extension = match format {
            image::ImageFormat::Png => "png",
            image::ImageFormat::Jpeg => "jpeg",
            other => {
                return Err(DocxError::ImageError(format!(
                    "Unsupported image format: {other:?}"
                )))
            }
        };
        let (width_px, height_px) = ImageReader::with_format(Cursor::new(&data), format)
            .into_dimensions()
            .map_err(|e| DocxError::ImageError(e.to_string()))?;
        if width_px == 0 || height_px == 0 {
            return Err(DocxError::ImageError("Image has no pixels".to_string()));
        }
        Ok(Self {
            data,
            extension,
            width_px,
            height_px,
        })
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension {
            "png" => "image/png",
            _ => "image/jpeg",
        }
    }

    /// Extent in EMU for a picture `width_inches` wide, keeping aspect ratio
    pub fn extent_emu(&self, width_inches: f64) -> (i64, i64) {
        let cx = (width_inches * EMU_PER_INCH).round();
        let cy = (cx * self.height_px as f64 / self.width_px as f64).round();
        (cx as i64, cy as i64)
    }
}

/// One signature paragraph placed in the footers
#[derive(Debug, Clone, Copy)]
pub struct FooterSignature<'a> {
    pub image: &'a SignatureImage,
    pub alignment: Alignment,
    pub width_inches: f64,
}

impl DocxPackage {
    /// Append signature paragraphs at the end of the body
    ///
    /// `spacing` empty paragraphs holding a line break come first, followed
    /// by one aligned paragraph with a bold label and the picture.
    pub fn append_signature(
        &mut self,
        image: &SignatureImage,
        alignment: Alignment,
        width_inches: f64,
        spacing: usize,
    ) -> Result<()> {
        let target = self.add_media(image)?;
        let mut rels = self.relationships(DOCUMENT_PART)?;
        let rel_id = rels.add(IMAGE_RELATIONSHIP, &target);
        self.set_relationships(DOCUMENT_PART, &rels);

        let mut fragment = String::new();
        for _ in 0..spacing {
            fragment.push_str("<w:p><w:r><w:br/></w:r></w:p>");
        }
        let drawing_id = self.allocate_drawing_id()?;
        fragment.push_str(&signature_paragraph(
            image,
            alignment,
            width_inches,
            &rel_id,
            drawing_id,
        ));

        let xml = self.part_str(DOCUMENT_PART)?;
        let at = body_insertion_point(&xml)?;
        let updated = splice(&xml, vec![(at, at, fragment)]);
        self.set_part(DOCUMENT_PART, updated.into_bytes());

        log::debug!(
            "Appended {} signature at end of body ({} in wide, {} spacing paragraphs)",
            alignment,
            width_inches,
            spacing
        );
        Ok(())
    }

    /// Replace the default footer of every section with signature paragraphs
    ///
    /// Every section shows all `signatures`, in order.
    pub fn replace_footers(&mut self, signatures: &[FooterSignature<'_>]) -> Result<()> {
        let targets = signatures
            .iter()
            .map(|sig| self.add_media(sig.image))
            .collect::<Result<Vec<_>>>()?;

        for footer in self.section_footers()? {
            let mut rels = self.relationships(&footer)?;
            let mut paragraphs = String::new();
            for (sig, target) in signatures.iter().zip(&targets) {
                let rel_id = rels.add(IMAGE_RELATIONSHIP, target);
                let drawing_id = self.allocate_drawing_id()?;
                paragraphs.push_str(&signature_paragraph(
                    sig.image,
                    sig.alignment,
                    sig.width_inches,
                    &rel_id,
                    drawing_id,
                ));
            }
            self.set_relationships(&footer, &rels);

            let xml = self.part_str(&footer)?;
            let updated = match find_elements(&footer, &xml, "ftr", None)?.first() {
                Some(root) if !root.empty => splice(
                    &xml,
                    vec![(root.open_end, root.close_start, paragraphs)],
                ),
                _ => footer_xml(&paragraphs),
            };
            self.set_part(&footer, updated.into_bytes());
            log::debug!("Replaced {} with {} signature(s)", footer, signatures.len());
        }
        Ok(())
    }

    /// Add a picture to the first paragraph of every section's footer
    ///
    /// Existing footer content is kept, so the signature shows on every page.
    pub fn append_footer_image(&mut self, image: &SignatureImage, width_inches: f64) -> Result<()> {
        let target = self.add_media(image)?;

        for footer in self.section_footers()? {
            let mut rels = self.relationships(&footer)?;
            let rel_id = rels.add(IMAGE_RELATIONSHIP, &target);
            self.set_relationships(&footer, &rels);

            let drawing_id = self.allocate_drawing_id()?;
            let run = picture_run(image, width_inches, &rel_id, drawing_id);

            let xml = self.part_str(&footer)?;
            let updated = match find_elements(&footer, &xml, "ftr", None)?.first() {
                Some(root) if !root.empty => {
                    let paragraphs = find_elements(&footer, &xml, "p", Some("ftr"))?;
                    match paragraphs.first() {
                        Some(p) if p.empty => splice(
                            &xml,
                            vec![(
                                p.start,
                                p.end,
                                format!("{}{run}</w:p>", open_tag_of_empty(p.outer(&xml))),
                            )],
                        ),
                        Some(p) => splice(&xml, vec![(p.close_start, p.close_start, run)]),
                        None => splice(
                            &xml,
                            vec![(root.close_start, root.close_start, format!("<w:p>{run}</w:p>"))],
                        ),
                    }
                }
                _ => footer_xml(&format!("<w:p>{run}</w:p>")),
            };
            self.set_part(&footer, updated.into_bytes());
            log::debug!("Added signature picture to {}", footer);
        }
        Ok(())
    }

    /// Store image data as a new media part and return its target relative
    /// to `word/`
    fn add_media(&mut self, image: &SignatureImage) -> Result<String> {
        let part = self.unused_part_name("word/media/signature", &format!(".{}", image.extension));
        self.set_part(&part, image.data.clone());

        let types = self.part_str(CONTENT_TYPES_PART)?;
        let types = ensure_default(&types, image.extension, image.content_type())?;
        self.set_part(CONTENT_TYPES_PART, types.into_bytes());

        Ok(part.trim_start_matches("word/").to_string())
    }

    fn allocate_drawing_id(&mut self) -> Result<u32> {
        let next = match self.next_drawing_id {
            Some(id) => id,
            None => self.max_drawing_id()? + 1,
        };
        self.next_drawing_id = Some(next + 1);
        Ok(next)
    }

    fn max_drawing_id(&self) -> Result<u32> {
        let parts: Vec<String> = self
            .part_names()
            .filter(|n| n.starts_with("word/") && n.ends_with(".xml"))
            .map(str::to_string)
            .collect();
        let mut max = 0;
        for part in parts {
            let xml = self.part_str(&part)?;
            if !xml.contains("docPr") {
                continue;
            }
            for span in find_elements(&part, &xml, "docPr", None)? {
                if let Some(id) = span.attr("id").and_then(|v| v.parse::<u32>().ok()) {
                    max = max.max(id);
                }
            }
        }
        Ok(max)
    }

    /// Default footer part of every section, creating one where missing
    ///
    /// Sections without a default footer share a single new footer part.
    /// Parts referenced by several sections are listed once.
    fn section_footers(&mut self) -> Result<Vec<String>> {
        let xml = self.part_str(DOCUMENT_PART)?;
        let mut rels = self.relationships(DOCUMENT_PART)?;
        let sections = find_elements(DOCUMENT_PART, &xml, "sectPr", None)?;

        let mut footers: Vec<String> = Vec::new();
        let mut missing: Vec<&ElementSpan> = Vec::new();

        for section in &sections {
            let references = find_elements(DOCUMENT_PART, section.outer(&xml), "footerReference", None)?;
            let default_ref = references
                .iter()
                .find(|r| r.attr("type") == Some("default"))
                .and_then(|r| r.attr("id"))
                .and_then(|id| rels.get(id))
                .map(|rel| resolve_target(DOCUMENT_PART, &rel.target))
                .filter(|part| self.has_part(part));
            match default_ref {
                Some(part) => {
                    if !footers.contains(&part) {
                        footers.push(part);
                    }
                }
                None => missing.push(section),
            }
        }

        if missing.is_empty() && !sections.is_empty() {
            return Ok(footers);
        }

        let part = self.unused_part_name("word/footer", ".xml");
        self.set_part(&part, footer_xml("<w:p/>").into_bytes());
        let rel_id = rels.add(FOOTER_RELATIONSHIP, part.trim_start_matches("word/"));
        let types = self.part_str(CONTENT_TYPES_PART)?;
        let types = ensure_override(&types, &part, FOOTER_CONTENT_TYPE)?;
        self.set_part(CONTENT_TYPES_PART, types.into_bytes());
        self.set_relationships(DOCUMENT_PART, &rels);

        let reference = format!(
            r#"<w:footerReference xmlns:r="{NS_R}" w:type="default" r:id="{rel_id}"/>"#
        );
        let edits = if sections.is_empty() {
            let at = body_insertion_point(&xml)?;
            vec![(at, at, format!("<w:sectPr>{reference}</w:sectPr>"))]
        } else {
            missing
                .iter()
                .map(|section| {
                    if section.empty {
                        let open = open_tag_of_empty(section.outer(&xml));
                        (
                            section.start,
                            section.end,
                            format!("{open}{reference}</w:sectPr>"),
                        )
                    } else {
                        (section.open_end, section.open_end, reference.clone())
                    }
                })
                .collect()
        };
        let updated = splice(&xml, edits);
        self.set_part(DOCUMENT_PART, updated.into_bytes());

        log::debug!("Created {} for {} section(s)", part, missing.len().max(1));
        footers.push(part);
        Ok(footers)
    }
}

/// Where new body content goes: before the body-level `w:sectPr`, else
/// before `</w:body>`
fn body_insertion_point(xml: &str) -> Result<usize> {
    if let Some(section) = find_elements(DOCUMENT_PART, xml, "sectPr", Some("body"))?.last() {
        return Ok(section.start);
    }
    find_elements(DOCUMENT_PART, xml, "body", None)?
        .first()
        .filter(|body| !body.empty)
        .map(|body| body.close_start)
        .ok_or_else(|| DocxError::XmlError {
            part: DOCUMENT_PART.to_string(),
            message: "document has no w:body".to_string(),
        })
}

fn footer_xml(content: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:ftr xmlns:w=\"{NS_W}\" xmlns:r=\"{NS_R}\">{content}</w:ftr>"
    )
}

/// Aligned paragraph with a bold label run followed by the picture
fn signature_paragraph(
    image: &SignatureImage,
    alignment: Alignment,
    width_inches: f64,
    rel_id: &str,
    drawing_id: u32,
) -> String {
    format!(
        r#"<w:p><w:pPr><w:jc w:val="{}"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>{}</w:t></w:r>{}</w:p>"#,
        alignment.as_str(),
        escape(SIGNATURE_LABEL),
        picture_run(image, width_inches, rel_id, drawing_id)
    )
}

/// Run holding an inline picture
fn picture_run(image: &SignatureImage, width_inches: f64, rel_id: &str, drawing_id: u32) -> String {
    let (cx, cy) = image.extent_emu(width_inches);
    format!(
        concat!(
            r#"<w:r><w:drawing>"#,
            r#"<wp:inline xmlns:wp="{wp}" distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Signature {id}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="{a}" noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
            r#"<a:graphic xmlns:a="{a}"><a:graphicData uri="{pic}">"#,
            r#"<pic:pic xmlns:pic="{pic}">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="signature{id}.{ext}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip xmlns:r="{r}" r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
        ),
        wp = NS_WP,
        a = NS_A,
        pic = NS_PIC,
        r = NS_R,
        cx = cx,
        cy = cy,
        id = drawing_id,
        ext = image.extension,
        rel = rel_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use pretty_assertions::assert_eq;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_signature_image_from_png() {
        let image = SignatureImage::from_bytes(png(300, 100)).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!((image.width_px, image.height_px), (300, 100));
        assert_eq!(image.content_type(), "image/png");
    }

    #[test]
    fn test_signature_image_rejects_garbage() {
        assert!(SignatureImage::from_bytes(b"definitely not an image".to_vec()).is_err());
    }

    #[test]
    fn test_extent_keeps_aspect_ratio() {
        let image = SignatureImage::from_bytes(png(300, 100)).unwrap();
        assert_eq!(image.extent_emu(2.0), (1_828_800, 609_600));
        assert_eq!(image.extent_emu(1.8), (1_645_920, 548_640));
    }

    #[test]
    fn test_signature_paragraph_shape() {
        let image = SignatureImage::from_bytes(png(300, 100)).unwrap();
        let xml = signature_paragraph(&image, Alignment::Right, 1.8, "rId9", 4);
        assert!(xml.starts_with(r#"<w:p><w:pPr><w:jc w:val="right"/></w:pPr>"#));
        assert!(xml.contains("<w:b/></w:rPr><w:t>Signature</w:t>"));
        assert!(xml.contains(r#"r:embed="rId9""#));
        assert!(xml.contains(r#"<wp:docPr id="4""#));
        assert!(xml.ends_with("</w:r></w:p>"));
    }

    #[test]
    fn test_body_insertion_point_prefers_sectpr() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p/><w:sectPr/></w:body></w:document>"#;
        let at = body_insertion_point(xml).unwrap();
        assert!(xml[at..].starts_with("<w:sectPr/>"));
    }

    #[test]
    fn test_body_insertion_point_without_sectpr() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p/></w:body></w:document>"#;
        let at = body_insertion_point(xml).unwrap();
        assert!(xml[at..].starts_with("</w:body>"));
    }

    #[test]
    fn test_body_insertion_ignores_paragraph_sections() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p><w:pPr><w:sectPr/></w:pPr></w:p><w:p/></w:body></w:document>"#;
        let at = body_insertion_point(xml).unwrap();
        assert!(xml[at..].starts_with("</w:body>"));
    }
}
