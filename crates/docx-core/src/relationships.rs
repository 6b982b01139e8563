//! Part relationships (`_rels/*.rels`)

use crate::xml::find_elements;
use crate::Result;
use quick_xml::escape::escape;

pub const IMAGE_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const FOOTER_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

const EMPTY_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#
);

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Relationships of one part
///
/// Existing entries are kept verbatim; new entries are appended before the
/// closing `</Relationships>` tag.
#[derive(Debug, Clone)]
pub struct Relationships {
    xml: String,
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self {
            xml: EMPTY_RELATIONSHIPS.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn parse(part: &str, xml: &str) -> Result<Self> {
        let entries = find_elements(part, xml, "Relationship", None)?
            .into_iter()
            .filter_map(|span| {
                Some(Relationship {
                    id: span.attr("Id")?.to_string(),
                    rel_type: span.attr("Type").unwrap_or_default().to_string(),
                    target: span.attr("Target")?.to_string(),
                })
            })
            .collect();

        let xml = if xml.contains("</Relationships>") {
            xml.to_string()
        } else {
            // `<Relationships .../>` with no children
            let open = xml.trim_end().trim_end_matches("/>").trim_end();
            format!("{open}></Relationships>")
        };

        Ok(Self { xml, entries })
    }

    pub fn entries(&self) -> &[Relationship] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Any relationship whose target mentions `image`
    pub fn has_images(&self) -> bool {
        self.entries.iter().any(|r| r.target.contains("image"))
    }

    /// Next free id of the form `rId{max+1}`
    pub fn next_id(&self) -> String {
        let max = self
            .entries
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Add a relationship and return its id
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        let entry = format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id,
            escape(rel_type),
            escape(target)
        );
        let insert_at = self
            .xml
            .rfind("</Relationships>")
            .unwrap_or(self.xml.len());
        self.xml.insert_str(insert_at, &entry);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
        });
        id
    }

    pub fn to_xml(&self) -> &str {
        &self.xml
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

/// Relationships part that belongs to `part` (`word/document.xml` ->
/// `word/_rels/document.xml.rels`)
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the directory of its source part
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            s => segments.push(s),
        }
    }
    segments.join("/")
}
