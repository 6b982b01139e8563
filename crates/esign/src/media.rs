//! Files under the media root

use crate::{EsignError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Subdirectories of the media root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Documents,
    Signatures,
    SignedDocuments,
}

impl MediaKind {
    pub fn dir(self) -> &'static str {
        match self {
            MediaKind::Documents => "documents",
            MediaKind::Signatures => "signatures",
            MediaKind::SignedDocuments => "signed_documents",
        }
    }

    const ALL: [MediaKind; 3] = [
        MediaKind::Documents,
        MediaKind::Signatures,
        MediaKind::SignedDocuments,
    ];
}

/// Reads and writes files by media-relative path such as
/// `documents/lease.pdf`
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open the media root, creating its subdirectories
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for kind in MediaKind::ALL {
            fs::create_dir_all(root.join(kind.dir()))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a media-relative path
    pub fn path(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return Err(EsignError::Storage(format!(
                "invalid media path: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn read(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.path(relative)?;
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EsignError::NotFound(format!("File {relative}")),
            _ => EsignError::Io(e),
        })
    }

    /// Write under `name`, replacing any existing file
    pub fn write(&self, kind: MediaKind, name: &str, bytes: &[u8]) -> Result<String> {
        let relative = format!("{}/{}", kind.dir(), name);
        fs::write(self.path(&relative)?, bytes)?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), relative);
        Ok(relative)
    }

    /// Write under a sanitized `name`, suffixing it if the name is taken
    pub fn store(&self, kind: MediaKind, name: &str, bytes: &[u8]) -> Result<String> {
        let name = self.available_name(kind, &sanitize_file_name(name));
        self.write(kind, &name, bytes)
    }

    /// Delete a file, returning whether it existed
    pub fn delete(&self, relative: &str) -> Result<bool> {
        match fs::remove_file(self.path(relative)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Media-relative paths of the files in one directory, sorted
    pub fn list(&self, kind: MediaKind) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(self.root.join(kind.dir()))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    files.push(format!("{}/{}", kind.dir(), name));
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn available_name(&self, kind: MediaKind, name: &str) -> String {
        if !self.exists(&format!("{}/{}", kind.dir(), name)) {
            return name.to_string();
        }
        let (stem, ext) = split_extension(name);
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let candidate = match ext {
                Some(ext) => format!("{stem}_{}.{ext}", &suffix[..7]),
                None => format!("{stem}_{}", &suffix[..7]),
            };
            if !self.exists(&format!("{}/{}", kind.dir(), candidate)) {
                return candidate;
            }
        }
    }
}

/// Final path component of a media-relative path
pub(crate) fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(i) => (&name[..i], Some(&name[i + 1..])),
    }
}

/// Keep letters, digits, `-`, `_` and `.`; spaces become underscores
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') => Some(c),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Lease (v2).pdf"), "My_Lease_v2.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\a.docx"), "a.docx");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn test_open_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::open(dir.path().join("media")).unwrap();
        assert!(media.root().join("documents").is_dir());
        assert!(media.root().join("signatures").is_dir());
        assert!(media.root().join("signed_documents").is_dir());
    }

    #[test]
    fn test_store_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::open(dir.path()).unwrap();

        let first = media.store(MediaKind::Documents, "a.pdf", b"one").unwrap();
        let second = media.store(MediaKind::Documents, "a.pdf", b"two").unwrap();
        assert_eq!(first, "documents/a.pdf");
        assert_ne!(first, second);
        assert!(second.starts_with("documents/a_") && second.ends_with(".pdf"));
        assert_eq!(media.read(&first).unwrap(), b"one");
        assert_eq!(media.read(&second).unwrap(), b"two");
        assert_eq!(media.list(MediaKind::Documents).unwrap().len(), 2);
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::open(dir.path()).unwrap();
        media.write(MediaKind::SignedDocuments, "s.pdf", b"one").unwrap();
        let path = media.write(MediaKind::SignedDocuments, "s.pdf", b"two").unwrap();
        assert_eq!(media.read(&path).unwrap(), b"two");
    }

    #[test]
    fn test_delete_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::open(dir.path()).unwrap();
        let path = media.write(MediaKind::Signatures, "s.png", b"x").unwrap();
        assert!(media.delete(&path).unwrap());
        assert!(!media.delete(&path).unwrap());
        assert!(matches!(media.read(&path), Err(EsignError::NotFound(_))));
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::open(dir.path()).unwrap();
        assert!(media.path("../secret").is_err());
        assert!(media.path("/etc/passwd").is_err());
        assert!(media.path("").is_err());
        assert_eq!(file_name("documents/a.pdf"), "a.pdf");
    }
}
