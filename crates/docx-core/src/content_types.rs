//! `[Content_Types].xml` maintenance

use crate::xml::find_elements;
use crate::{Result, CONTENT_TYPES_PART};

pub(crate) const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

/// Add a `<Default>` entry for `extension` unless one exists
pub(crate) fn ensure_default(xml: &str, extension: &str, content_type: &str) -> Result<String> {
    let exists = find_elements(CONTENT_TYPES_PART, xml, "Default", None)?
        .iter()
        .any(|span| {
            span.attr("Extension")
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        });
    if exists {
        return Ok(xml.to_string());
    }
    let entry = format!(r#"<Default Extension="{extension}" ContentType="{content_type}"/>"#);
    Ok(insert_before_close(xml, &entry))
}

/// Add an `<Override>` entry for `part` (no leading slash) unless one exists
pub(crate) fn ensure_override(xml: &str, part: &str, content_type: &str) -> Result<String> {
    let part_name = format!("/{part}");
    let exists = find_elements(CONTENT_TYPES_PART, xml, "Override", None)?
        .iter()
        .any(|span| span.attr("PartName") == Some(part_name.as_str()));
    if exists {
        return Ok(xml.to_string());
    }
    let entry = format!(r#"<Override PartName="{part_name}" ContentType="{content_type}"/>"#);
    Ok(insert_before_close(xml, &entry))
}

fn insert_before_close(xml: &str, entry: &str) -> String {
    let mut out = xml.to_string();
    let at = out.rfind("</Types>").unwrap_or(out.len());
    out.insert_str(at, entry);
    out
}
