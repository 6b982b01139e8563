//! Span-based XML scanning
//!
//! Parts are edited as text: quick-xml finds the byte ranges of the
//! elements we care about and edits are spliced into the original string,
//! so everything we do not touch is kept byte for byte.

use crate::{DocxError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Location of one element inside a part
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementSpan {
    /// Offset of `<` of the start tag
    pub start: usize,
    /// Offset just past the start tag
    pub open_end: usize,
    /// Offset of `<` of the end tag (equals `open_end` for empty elements)
    pub close_start: usize,
    /// Offset just past the end tag
    pub end: usize,
    pub empty: bool,
    /// Attributes keyed by local name
    pub attrs: Vec<(String, String)>,
}

impl ElementSpan {
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == local)
            .map(|(_, value)| value.as_str())
    }

    pub fn outer<'a>(&self, xml: &'a str) -> &'a str {
        &xml[self.start..self.end]
    }
}

/// Local part of a qualified name (`w:p` -> `p`)
pub(crate) fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().position(|&b| b == b':') {
        Some(idx) => &qname[idx + 1..],
        None => qname,
    }
}

fn collect_attrs(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .filter_map(std::result::Result::ok)
        .map(|a| {
            (
                String::from_utf8_lossy(a.key.local_name().as_ref()).to_string(),
                String::from_utf8_lossy(&a.value).to_string(),
            )
        })
        .collect()
}

/// Find every element whose local name is `name` and whose parent's local
/// name is `parent` (any parent when `None`), in document order
pub(crate) fn find_elements(
    part: &str,
    xml: &str,
    name: &str,
    parent: Option<&str>,
) -> Result<Vec<ElementSpan>> {
    struct Frame {
        name: Vec<u8>,
        matched: Option<ElementSpan>,
    }

    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut spans = Vec::new();

    loop {
        let before = reader.buffer_position();
        let event = reader.read_event().map_err(|e| DocxError::XmlError {
            part: part.to_string(),
            message: format!("at {}: {e}", reader.buffer_position()),
        })?;
        let after = reader.buffer_position();

        let parent_matches = |stack: &[Frame]| match parent {
            None => true,
            Some(p) => stack
                .last()
                .map(|f| local_name(&f.name) == p.as_bytes())
                .unwrap_or(false),
        };

        match event {
            Event::Start(e) => {
                let qname = e.name().as_ref().to_vec();
                let matched = if local_name(&qname) == name.as_bytes() && parent_matches(&stack) {
                    Some(ElementSpan {
                        start: before,
                        open_end: after,
                        close_start: after,
                        end: after,
                        empty: false,
                        attrs: collect_attrs(&e),
                    })
                } else {
                    None
                };
                stack.push(Frame {
                    name: qname,
                    matched,
                });
            }
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == name.as_bytes() && parent_matches(&stack) {
                    spans.push(ElementSpan {
                        start: before,
                        open_end: after,
                        close_start: after,
                        end: after,
                        empty: true,
                        attrs: collect_attrs(&e),
                    });
                }
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    if let Some(mut span) = frame.matched {
                        span.close_start = before;
                        span.end = after;
                        spans.push(span);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Nested matches close before their ancestors
    spans.sort_by_key(|s| s.start);
    Ok(spans)
}

/// Concatenated run text of a paragraph fragment
///
/// `w:t` contributes its text, `w:tab` a tab and `w:br`/`w:cr` a newline.
pub(crate) fn paragraph_text(fragment: &str) -> String {
    let mut reader = Reader::from_str(fragment);
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"t" => in_text = true,
            Ok(Event::End(e)) if local_name(e.name().as_ref()) == b"t" => in_text = false,
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                if let Ok(t) = e.unescape() {
                    text.push_str(&t);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    text
}

/// Apply `(start, end, replacement)` edits; ranges must not overlap
pub(crate) fn splice(xml: &str, mut edits: Vec<(usize, usize, String)>) -> String {
    edits.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    let mut out = xml.to_string();
    for (start, end, replacement) in edits {
        out.replace_range(start..end, &replacement);
    }
    out
}

/// Rewrite a self-closing tag `<x a="1"/>` as an open tag `<x a="1">`
pub(crate) fn open_tag_of_empty(tag: &str) -> String {
    let trimmed = tag.trim_end_matches("/>").trim_end();
    format!("{trimmed}>")
}
