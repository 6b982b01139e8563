//! Integration tests for docx-core
//!
//! Packages are assembled in memory with `zip`, edited, written back out
//! and reopened.

use docx_core::{Alignment, DocxPackage, FooterSignature, SignatureImage, DOCUMENT_PART};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}</w:body></w:document>"#
    )
}

fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

/// Build a DOCX package from (name, content) pairs
fn create_test_docx(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<()> = FileOptions::default();
    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn simple_docx(body: &str) -> Vec<u8> {
    create_test_docx(&[
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/document.xml", document_xml(body)),
    ])
}

/// Document with one section whose default footer is `word/footer1.xml`
fn docx_with_footer(footer_body: &str) -> Vec<u8> {
    let rels = DOCUMENT_RELS.replace(
        "</Relationships>",
        r#"<Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/></Relationships>"#,
    );
    let body = format!(
        r#"{}<w:sectPr><w:footerReference w:type="default" r:id="rId5"/><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#,
        paragraph("Body text")
    );
    let footer = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{footer_body}</w:ftr>"#
    );
    create_test_docx(&[
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("word/_rels/document.xml.rels", rels),
        ("word/document.xml", document_xml(&body)),
        ("word/footer1.xml", footer),
    ])
}

fn signature_png() -> Vec<u8> {
    use image::{ImageBuffer, Rgba};
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

fn reopen(package: &DocxPackage) -> DocxPackage {
    DocxPackage::from_bytes(&package.to_bytes().unwrap()).unwrap()
}

#[test]
fn test_info_counts_body_level_elements() {
    let body = format!(
        "{}{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl><w:p/>",
        paragraph("First"),
        paragraph("Second"),
        paragraph("Cell")
    );
    let docx = DocxPackage::from_bytes(&simple_docx(&body)).unwrap();
    let info = docx.info().unwrap();

    assert_eq!(info.num_paragraphs, 3);
    assert_eq!(info.num_tables, 1);
    assert_eq!(info.num_pages, 1);
    assert!(!info.has_images);
}

#[test]
fn test_info_empty_document_has_one_page() {
    let docx = DocxPackage::from_bytes(&simple_docx("")).unwrap();
    let info = docx.info().unwrap();
    assert_eq!(info.num_paragraphs, 0);
    assert_eq!(info.num_pages, 1);
    assert!(docx.text_pages().unwrap().is_empty());
}

#[test]
fn test_text_pages_split_on_length() {
    let long = "a".repeat(700);
    let body = format!("{}{}{}", paragraph(&long), paragraph(&long), paragraph("end"));
    let docx = DocxPackage::from_bytes(&simple_docx(&body)).unwrap();

    let pages = docx.text_pages().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[&1], long);
    assert_eq!(pages[&2], format!("{long}\nend"));
    assert_eq!(docx.info().unwrap().num_pages, 2);
}

#[test]
fn test_append_signature_before_section_properties() {
    let body = format!("{}<w:sectPr><w:pgSz w:w=\"12240\"/></w:sectPr>", paragraph("Hello"));
    let mut docx = DocxPackage::from_bytes(&simple_docx(&body)).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();

    docx.append_signature(&image, Alignment::Right, 1.8, 3).unwrap();
    let docx = reopen(&docx);

    let xml = docx.part_str(DOCUMENT_PART).unwrap();
    let sig_at = xml.find(r#"<w:jc w:val="right"/>"#).unwrap();
    let sect_at = xml.find("<w:sectPr>").unwrap();
    assert!(sig_at < sect_at);
    assert_eq!(xml.matches("<w:p><w:r><w:br/></w:r></w:p>").count(), 3);
    assert!(xml.contains("<w:t>Signature</w:t>"));
    // 1.8in wide, 2:1 aspect ratio
    assert!(xml.contains(r#"<wp:extent cx="1645920" cy="822960"/>"#));

    assert_eq!(docx.part("word/media/signature1.png"), Some(image.data.as_slice()));
    let rels = docx.relationships(DOCUMENT_PART).unwrap();
    let image_rel = rels.get("rId2").unwrap();
    assert_eq!(image_rel.target, "media/signature1.png");
    assert!(docx.info().unwrap().has_images);

    let types = docx.part_str("[Content_Types].xml").unwrap();
    assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
}

#[test]
fn test_append_signature_twice_uses_distinct_parts() {
    let mut docx = DocxPackage::from_bytes(&simple_docx(&paragraph("Hello"))).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();

    docx.append_signature(&image, Alignment::Left, 2.0, 3).unwrap();
    docx.append_signature(&image, Alignment::Right, 1.8, 3).unwrap();
    let docx = reopen(&docx);

    assert!(docx.has_part("word/media/signature1.png"));
    assert!(docx.has_part("word/media/signature2.png"));
    let xml = docx.part_str(DOCUMENT_PART).unwrap();
    assert!(xml.contains(r#"<wp:docPr id="1""#));
    assert!(xml.contains(r#"<wp:docPr id="2""#));
    let left = xml.find(r#"<w:jc w:val="left"/>"#).unwrap();
    let right = xml.find(r#"<w:jc w:val="right"/>"#).unwrap();
    assert!(left < right);
    // One paragraph of text, six spacers, two signatures
    assert_eq!(docx.info().unwrap().num_paragraphs, 9);
}

#[test]
fn test_replace_footers_clears_existing_content() {
    let mut docx = DocxPackage::from_bytes(&docx_with_footer(&paragraph("Page footer"))).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();

    docx.replace_footers(&[
        FooterSignature {
            image: &image,
            alignment: Alignment::Left,
            width_inches: 2.0,
        },
        FooterSignature {
            image: &image,
            alignment: Alignment::Right,
            width_inches: 1.8,
        },
    ])
    .unwrap();
    let docx = reopen(&docx);

    let footer = docx.part_str("word/footer1.xml").unwrap();
    assert!(!footer.contains("Page footer"));
    assert_eq!(footer.matches("<w:t>Signature</w:t>").count(), 2);
    assert!(footer.starts_with("<?xml"));

    let rels = docx.relationships("word/footer1.xml").unwrap();
    assert_eq!(rels.entries().len(), 2);
    assert_eq!(rels.get("rId1").unwrap().target, "media/signature1.png");
    assert_eq!(rels.get("rId2").unwrap().target, "media/signature2.png");
}

#[test]
fn test_replace_footers_creates_missing_footer() {
    let body = format!("{}<w:sectPr/>", paragraph("No footer here"));
    let mut docx = DocxPackage::from_bytes(&simple_docx(&body)).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();

    docx.replace_footers(&[FooterSignature {
        image: &image,
        alignment: Alignment::Right,
        width_inches: 1.8,
    }])
    .unwrap();
    let docx = reopen(&docx);

    assert!(docx.has_part("word/footer1.xml"));
    let xml = docx.part_str(DOCUMENT_PART).unwrap();
    assert!(xml.contains(r#"w:type="default" r:id="rId2""#));
    assert!(xml.contains("</w:sectPr>"));

    let rels = docx.relationships(DOCUMENT_PART).unwrap();
    assert_eq!(rels.get("rId2").unwrap().target, "footer1.xml");

    let types = docx.part_str("[Content_Types].xml").unwrap();
    assert!(types.contains(r#"PartName="/word/footer1.xml""#));
    let footer = docx.part_str("word/footer1.xml").unwrap();
    assert!(footer.contains(r#"<w:jc w:val="right"/>"#));
}

#[test]
fn test_append_footer_image_keeps_footer_text() {
    let mut docx = DocxPackage::from_bytes(&docx_with_footer(&paragraph("Page footer"))).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();

    docx.append_footer_image(&image, 1.5).unwrap();
    let docx = reopen(&docx);

    let footer = docx.part_str("word/footer1.xml").unwrap();
    assert!(footer.contains("Page footer"));
    assert!(footer.contains(r#"<wp:extent cx="1371600" cy="685800"/>"#));
    // Picture is appended inside the first paragraph
    assert!(footer.contains("</w:drawing></w:r></w:p></w:ftr>"));
    assert!(!footer.contains("<w:t>Signature</w:t>"));
}

#[test]
fn test_append_footer_image_fills_empty_paragraph() {
    let mut docx = DocxPackage::from_bytes(&docx_with_footer("<w:p/>")).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();

    docx.append_footer_image(&image, 1.5).unwrap();
    let footer = docx.part_str("word/footer1.xml").unwrap();
    assert!(footer.contains("<w:p><w:r><w:drawing>"));
}

#[test]
fn test_save_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signed.docx");

    let mut docx = DocxPackage::from_bytes(&simple_docx(&paragraph("Hello"))).unwrap();
    let image = SignatureImage::from_bytes(signature_png()).unwrap();
    docx.append_signature(&image, Alignment::Left, 2.0, 3).unwrap();
    docx.save(&path).unwrap();

    let reopened = DocxPackage::open(&path).unwrap();
    assert!(reopened.has_part("word/media/signature1.png"));
    assert!(docx_core::is_zip(&std::fs::read(&path).unwrap()));
}
