//! WASM bindings for esign
//!
//! This crate provides a JavaScript-friendly API for:
//! - Placing a signature image on PDF and DOCX documents in the browser
//! - Reading page information for the preview pane
//! - Mapping preview clicks to PDF coordinates
//! - Suggesting where a signature belongs
//! - Listing the signature fields and contract terms in a document
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { signPdf, documentInfo, mapPreviewToPdf } from 'esign-wasm';
//!
//! await init();
//!
//! const info = documentInfo(pdfBytes, 'lease.pdf');
//! const point = mapPreviewToPdf(120, 340, 800, 1035, info.page_width, info.page_height);
//!
//! const request = JSON.stringify({
//!   signature_id: 'mine',
//!   x: 120, y: 340, page: 1,
//!   preview_width: 800, preview_height: 1035,
//! });
//! const signed = signPdf(pdfBytes, signaturePng, request);
//! ```

use signing::{
    analyze_for_signature, document_info, extract_key_information, map_preview_to_pdf, sign_docx,
    sign_pdf, suggest_positions, DocumentFormat, PageSize, PlacementConfig, PreviewPoint, PreviewSize,
    SignRequest,
};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(message: impl ToString) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

/// Sign with one image used for every placement in the request
fn sign_with_image(
    format: DocumentFormat,
    document: &[u8],
    signature: &[u8],
    request_json: &str,
) -> signing::Result<Vec<u8>> {
    let request = SignRequest::from_json(request_json)?;
    let placements = request.placements();
    let images: HashMap<String, Vec<u8>> = placements
        .iter()
        .map(|p| (p.signature_id.clone(), signature.to_vec()))
        .collect();
    let config = PlacementConfig::default();

    let outcome = match format {
        DocumentFormat::Pdf => {
            sign_pdf(document, &placements, &images, request.preview(), &config)?
        }
        DocumentFormat::Docx => sign_docx(document, &placements, &images, &config)?,
    };
    Ok(outcome.bytes)
}

/// Place a signature on a PDF
///
/// @param pdfBytes - PDF file bytes (Uint8Array)
/// @param signatureBytes - PNG or JPEG signature image (Uint8Array)
/// @param requestJson - Placement request, single or with a `signatures` array
/// @returns Signed PDF bytes (Uint8Array)
#[wasm_bindgen(js_name = signPdf)]
pub fn sign_pdf_js(
    pdf_bytes: &[u8],
    signature_bytes: &[u8],
    request_json: &str,
) -> Result<Vec<u8>, JsValue> {
    sign_with_image(DocumentFormat::Pdf, pdf_bytes, signature_bytes, request_json)
        .map_err(js_error)
}

/// Place a signature in a DOCX
///
/// @param docxBytes - DOCX file bytes (Uint8Array)
/// @param signatureBytes - PNG or JPEG signature image (Uint8Array)
/// @param requestJson - Placement request, single or with a `signatures` array
/// @returns Signed DOCX bytes (Uint8Array)
#[wasm_bindgen(js_name = signDocx)]
pub fn sign_docx_js(
    docx_bytes: &[u8],
    signature_bytes: &[u8],
    request_json: &str,
) -> Result<Vec<u8>, JsValue> {
    sign_with_image(DocumentFormat::Docx, docx_bytes, signature_bytes, request_json)
        .map_err(js_error)
}

/// Page count, first page size and content counts
///
/// @param bytes - Document bytes (Uint8Array)
/// @param fileName - Used for the extension (.pdf or .docx)
/// @returns Info object
#[wasm_bindgen(js_name = documentInfo)]
pub fn document_info_js(bytes: &[u8], file_name: &str) -> Result<JsValue, JsValue> {
    let format = DocumentFormat::from_path(file_name).map_err(js_error)?;
    let info = document_info(bytes, format).map_err(js_error)?;
    Ok(serde_wasm_bindgen::to_value(&info)?)
}

/// Map a preview click to PDF points
///
/// @returns `{ x, y }` with a bottom-left origin
#[wasm_bindgen(js_name = mapPreviewToPdf)]
pub fn map_preview_to_pdf_js(
    x: f64,
    y: f64,
    preview_width: f64,
    preview_height: f64,
    page_width: f64,
    page_height: f64,
) -> Result<JsValue, JsValue> {
    let point = map_preview_to_pdf(
        PreviewPoint::new(x, y),
        PreviewSize::new(preview_width, preview_height),
        PageSize::new(page_width, page_height),
        &PlacementConfig::default(),
    );
    Ok(serde_wasm_bindgen::to_value(&point)?)
}

/// Keyword-based signature position suggestion
#[wasm_bindgen(js_name = suggestPositions)]
pub fn suggest_positions_js(text: &str) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&suggest_positions(text))?)
}

/// Pattern-based analysis of one page of text
#[wasm_bindgen(js_name = analyzeForSignature)]
pub fn analyze_for_signature_js(text: &str, page: usize) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&analyze_for_signature(text, page))?)
}

/// Signature and date fields plus contract terms found in the text
///
/// @returns `{ has_signature_field, has_date_field, document_length, key_terms }`
#[wasm_bindgen(js_name = extractKeyInformation)]
pub fn extract_key_information_js(text: &str) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&extract_key_information(text))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn create_test_pdf() -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![Object::Reference(page_id)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn signature_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(60, 20, image::Rgba([0, 0, 0, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_sign_with_image_uses_one_image_for_all_placements() {
        let request = r#"{
            "preview_width": 612, "preview_height": 792,
            "signatures": [
                {"signature_id": "a", "x": 100, "y": 200, "page": 1},
                {"signature_id": "b", "x": 0, "y": 0, "page": 0, "is_end_position": true}
            ]
        }"#;
        let signed =
            sign_with_image(DocumentFormat::Pdf, &create_test_pdf(), &signature_png(), request)
                .unwrap();

        let doc = lopdf::Document::load_mem(&signed).unwrap();
        let page_id = doc.get_pages()[&1];
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).to_string();
        assert!(content.contains("150 0 0 50 115 582 cm"));
        assert!(content.contains("150 0 0 50 50 30 cm"));
    }

    #[test]
    fn test_sign_with_image_rejects_bad_request() {
        let result = sign_with_image(
            DocumentFormat::Pdf,
            &create_test_pdf(),
            &signature_png(),
            "not json",
        );
        assert!(matches!(result, Err(signing::SigningError::JsonError(_))));
    }

    #[test]
    fn test_mapping_matches_signing_crate() {
        let point = map_preview_to_pdf(
            PreviewPoint::new(100.0, 200.0),
            PreviewSize::new(612.0, 792.0),
            PageSize::new(612.0, 792.0),
            &PlacementConfig::default(),
        );
        assert_eq!((point.x, point.y), (115.0, 582.0));
    }

    #[test]
    fn test_key_information_export_matches_signing_crate() {
        let info = extract_key_information("Witness signature and date");
        assert!(info.has_signature_field);
        assert!(info.has_date_field);
        assert_eq!(info.key_terms, vec!["witness".to_string()]);
    }
}
