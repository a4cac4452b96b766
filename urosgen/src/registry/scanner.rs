//! Interface file discovery.
//!
//! The registry does not touch the filesystem directly; it asks an
//! [`InterfaceScanner`] for the interface files under each configured root.
//! The default implementation walks the tree with `std::fs`, sorted so scans
//! are deterministic across platforms.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Fallback package name for files not nested under a package directory
pub const UNKNOWN_PACKAGE: &str = "unknown_package";

/// Interface file kind, inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Message file (.msg)
    Message,
    /// Service file (.srv)
    Service,
    /// Action file (.action)
    Action,
}

impl FileKind {
    /// Get the file extension for this kind
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Message => "msg",
            Self::Service => "srv",
            Self::Action => "action",
        }
    }

    /// Parse a kind from an extension string
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "msg" => Some(Self::Message),
            "srv" => Some(Self::Service),
            "action" => Some(Self::Action),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One discovered interface file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceFile {
    /// Absolute or root-relative path to the file
    pub path: PathBuf,
    /// Owning package (first directory component under the scan root)
    pub package: String,
    /// Interface name (file stem)
    pub name: String,
    /// File kind from the extension
    pub kind: FileKind,
}

/// File-enumeration collaborator injected into the registry
pub trait InterfaceScanner {
    /// List all interface files under one root directory
    ///
    /// # Errors
    ///
    /// Returns an IO error if the root cannot be read; the registry records
    /// it as a recoverable diagnostic and continues with the other roots.
    fn scan(&self, root: &Path) -> std::io::Result<Vec<InterfaceFile>>;
}

/// Filesystem-backed scanner used by default
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScanner;

impl InterfaceScanner for FsScanner {
    fn scan(&self, root: &Path) -> std::io::Result<Vec<InterfaceFile>> {
        let mut files = Vec::new();
        walk(root, root, &mut files)?;
        Ok(files)
    }
}

fn walk(dir: &Path, root: &Path, out: &mut Vec<InterfaceFile>) -> std::io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, root, out)?;
        } else if let Some(file) = classify(&path, root) {
            out.push(file);
        }
    }
    Ok(())
}

/// Build an [`InterfaceFile`] for a path with a recognized extension
fn classify(path: &Path, root: &Path) -> Option<InterfaceFile> {
    let kind = FileKind::from_extension(path.extension()?.to_str()?)?;
    let name = path.file_stem()?.to_str()?.to_string();
    let package = package_of(path, root);

    Some(InterfaceFile {
        path: path.to_path_buf(),
        package,
        name,
        kind,
    })
}

/// The package a file belongs to is the first directory component of its
/// path relative to the scan root
fn package_of(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .and_then(|rel| {
            let mut components = rel.components();
            let first = components.next()?;
            // A file directly under the root has no package directory
            components.next()?;
            Some(first.as_os_str().to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| UNKNOWN_PACKAGE.to_string())
}
