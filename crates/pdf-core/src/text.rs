//! Label text rendering with a standard Type1 font

use crate::document::Color;

/// Resource name used for the Helvetica font on every page we touch
pub const LABEL_FONT_RESOURCE: &str = "FSig";

/// Base font of the label resource (one of the standard 14, never embedded)
pub const LABEL_BASE_FONT: &str = "Helvetica";

/// A short line of text drawn next to a signature
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    /// Font size in points
    pub font_size: f64,
    pub color: Color,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
            color: Color::black(),
        }
    }
}

/// Escape text for a PDF literal string `( ... )`
///
/// Backslash and both parentheses are escaped; characters outside Latin-1
/// are replaced with `?` because the standard fonts use WinAnsiEncoding.
pub fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) < 0x80 => out.push(c),
            c if (c as u32) <= 0xFF => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// Generate PDF operators for a label at `x`/`y` (baseline, PDF coordinates)
pub fn generate_label_operators(label: &TextLabel, x: f64, y: f64) -> Vec<u8> {
    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        label.color.r, label.color.g, label.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", LABEL_FONT_RESOURCE, label.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("({}) Tj\n", escape_pdf_string(&label.text)));
    ops.push_str("ET\n");
    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape_pdf_string("Signature"), "Signature");
    }

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape_pdf_string(r"a(b)\c"), r"a\(b\)\\c");
        assert_eq!(escape_pdf_string("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_escape_latin1_and_beyond() {
        assert_eq!(escape_pdf_string("é"), "\\351");
        assert_eq!(escape_pdf_string("ก"), "?");
    }

    #[test]
    fn test_label_operators() {
        let label = TextLabel::new("Signature", 10.0);
        let ops = String::from_utf8(generate_label_operators(&label, 105.0, 15.0)).unwrap();
        assert_eq!(
            ops,
            "BT\n0 0 0 rg\n/FSig 10 Tf\n105 15 Td\n(Signature) Tj\nET\n"
        );
    }
}
