//! Zip container holding the package parts

use crate::relationships::{rels_part_name, Relationships};
use crate::{DocxError, Result, DOCUMENT_PART};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A DOCX package loaded in memory
///
/// Entries keep their original order when written back out; new parts are
/// appended at the end.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
    /// Next free `wp:docPr` id, computed on first use
    pub(crate) next_drawing_id: Option<u32>,
}

impl DocxPackage {
    /// Open a DOCX file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Open a DOCX package from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| DocxError::OpenError(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)?;
            entries.push((name, content));
        }

        let package = Self {
            entries,
            next_drawing_id: None,
        };
        if !package.has_part(DOCUMENT_PART) {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()));
        }
        log::debug!("Opened DOCX package with {} parts", package.entries.len());
        Ok(package)
    }

    /// Serialize the package back to zip bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Save the package to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Names of all parts in package order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Read a part as UTF-8 text
    pub fn part_str(&self, name: &str) -> Result<String> {
        let data = self
            .part(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        String::from_utf8(data.to_vec()).map_err(|e| DocxError::XmlError {
            part: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Replace a part, or append it when it does not exist yet
    pub fn set_part(&mut self, name: &str, data: impl Into<Vec<u8>>) {
        let data = data.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = data,
            None => self.entries.push((name.to_string(), data)),
        }
    }

    /// Relationships of `part`, empty when the part has no rels file
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        let rels_name = rels_part_name(part);
        if !self.has_part(&rels_name) {
            return Ok(Relationships::new());
        }
        Relationships::parse(&rels_name, &self.part_str(&rels_name)?)
    }

    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) {
        self.set_part(&rels_part_name(part), rels.to_xml().as_bytes().to_vec());
    }

    /// First free name of the form `{prefix}{n}{suffix}`, counting from 1
    pub(crate) fn unused_part_name(&self, prefix: &str, suffix: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{prefix}{n}{suffix}");
            if !self.has_part(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build_zip(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> = FileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_requires_document_part() {
        let data = build_zip(&[("[Content_Types].xml", "<Types/>")]);
        let err = DocxPackage::from_bytes(&data).unwrap_err();
        assert!(matches!(err, DocxError::MissingPart(p) if p == DOCUMENT_PART));
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxPackage::from_bytes(b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, DocxError::OpenError(_)));
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let data = build_zip(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", "<w:document/>"),
            ("docProps/core.xml", "<cp/>"),
        ]);
        let mut package = DocxPackage::from_bytes(&data).unwrap();
        package.set_part("word/media/signature1.png", vec![1, 2, 3]);

        let reopened = DocxPackage::from_bytes(&package.to_bytes().unwrap()).unwrap();
        let names: Vec<&str> = reopened.part_names().collect();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "word/document.xml",
                "docProps/core.xml",
                "word/media/signature1.png",
            ]
        );
        assert_eq!(reopened.part("word/media/signature1.png"), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_unused_part_name() {
        let data = build_zip(&[
            ("word/document.xml", "<w:document/>"),
            ("word/footer1.xml", "<w:ftr/>"),
        ]);
        let package = DocxPackage::from_bytes(&data).unwrap();
        assert_eq!(package.unused_part_name("word/footer", ".xml"), "word/footer2.xml");
    }

    #[test]
    fn test_missing_rels_is_empty() {
        let data = build_zip(&[("word/document.xml", "<w:document/>")]);
        let package = DocxPackage::from_bytes(&data).unwrap();
        assert!(package.relationships(DOCUMENT_PART).unwrap().entries().is_empty());
    }
}
