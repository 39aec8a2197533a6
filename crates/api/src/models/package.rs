//! Package descriptor as exchanged with analysis tooling.
//!
//! The in-memory [`PackageDescriptor`] keeps the raw (pre-link) import paths
//! next to the resolved edges. On the wire it is flattened into the field
//! layout expected by `go/packages` clients: the raw list is dropped, the
//! source list is emitted twice (`GoFiles` and `CompiledGoFiles`) and the
//! resolved imports map each import path to the imported package's ID.

use super::util::nullable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque unique identifier of a package.
///
/// Discovered packages use their cleaned absolute directory; built-in
/// packages use their path relative to the built-in library root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PackageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PackageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Category of a package error, encoded numerically on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum ErrorKind {
    #[default]
    Unknown,
    ListError,
    ParseError,
    TypeError,
}

impl From<ErrorKind> for u8 {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Unknown => 0,
            ErrorKind::ListError => 1,
            ErrorKind::ParseError => 2,
            ErrorKind::TypeError => 3,
        }
    }
}

impl From<u8> for ErrorKind {
    fn from(code: u8) -> Self {
        match code {
            1 => ErrorKind::ListError,
            2 => ErrorKind::ParseError,
            3 => ErrorKind::TypeError,
            _ => ErrorKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageError {
    /// "file:line:col", "file" or empty when the error has no position
    #[serde(default)]
    pub pos: String,
    pub msg: String,
    #[serde(default)]
    pub kind: ErrorKind,
}

impl PackageError {
    pub fn list(msg: impl Into<String>) -> Self {
        Self {
            pos: String::new(),
            msg: msg.into(),
            kind: ErrorKind::ListError,
        }
    }
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{}: {}", self.pos, self.msg)
        }
    }
}

/// Resolved metadata record for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WirePackage", from = "WirePackage")]
pub struct PackageDescriptor {
    pub id: PackageId,
    /// Declared package name chosen by majority vote across source files
    pub name: String,
    /// Logical module path
    pub pkg_path: String,
    /// Primary source files (absolute paths)
    pub source_files: Vec<String>,
    /// Non-source files living next to the sources
    pub other_files: Vec<String>,
    /// Import paths as written in the sources, before linking
    pub raw_imports: BTreeSet<String>,
    /// Import path -> imported package, only for paths present in the registry
    pub imports: BTreeMap<String, PackageId>,
    pub errors: Vec<PackageError>,
}

impl PackageDescriptor {
    pub fn new(id: impl Into<PackageId>, pkg_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            pkg_path: pkg_path.into(),
            source_files: Vec::new(),
            other_files: Vec::new(),
            raw_imports: BTreeSet::new(),
            imports: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Record a resolved import edge. Ignored if `import_path` was never
    /// declared by the package.
    pub fn link(&mut self, import_path: &str, target: PackageId) -> bool {
        if !self.raw_imports.contains(import_path) {
            return false;
        }
        self.imports.insert(import_path.to_string(), target);
        true
    }

    /// Raw imports that have no resolved edge.
    pub fn unresolved_imports(&self) -> impl Iterator<Item = &str> {
        self.raw_imports
            .iter()
            .filter(|path| !self.imports.contains_key(*path))
            .map(String::as_str)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WirePackage {
    #[serde(rename = "ID")]
    id: PackageId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    pkg_path: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    errors: Vec<PackageError>,
    #[serde(default, deserialize_with = "nullable")]
    go_files: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    compiled_go_files: Vec<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    other_files: Vec<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    imports: BTreeMap<String, PackageId>,
}

impl From<PackageDescriptor> for WirePackage {
    fn from(pkg: PackageDescriptor) -> Self {
        Self {
            id: pkg.id,
            name: pkg.name,
            pkg_path: pkg.pkg_path,
            errors: pkg.errors,
            compiled_go_files: pkg.source_files.clone(),
            go_files: pkg.source_files,
            other_files: pkg.other_files,
            imports: pkg.imports,
        }
    }
}

impl From<WirePackage> for PackageDescriptor {
    fn from(wire: WirePackage) -> Self {
        let raw_imports = wire.imports.keys().cloned().collect();
        let source_files = if wire.go_files.is_empty() {
            wire.compiled_go_files
        } else {
            wire.go_files
        };
        Self {
            id: wire.id,
            name: wire.name,
            pkg_path: wire.pkg_path,
            source_files,
            other_files: wire.other_files,
            raw_imports,
            imports: wire.imports,
            errors: wire.errors,
        }
    }
}
