//! Sources of package candidates.
//!
//! A discoverer turns one scan root into a stream of [`PackageCandidate`]s:
//! directories that will become packages once their files are extracted.
//! The manifest scanner serves recursive patterns, the owner lookup serves
//! single-file patterns and the stdlib discoverer synthesizes the built-in
//! library.

mod owner;
mod scanner;
mod stdlib;

pub use owner::OwnerLookup;
pub use scanner::{ManifestScanner, read_manifest};
pub use stdlib::StdlibDiscoverer;

use crate::util::clean_path;
use gnodriver_api::PackageId;
use gnodriver_plugin::ManifestInfo;
use std::path::{Path, PathBuf};

/// How a candidate directory qualified as a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Directory holding a valid manifest
    Manifest(ManifestInfo),
    /// Directory under the built-in library root, keyed by its relative path
    Builtin { rel_path: String },
    /// Manifest-less directory reached through an import of `import_path`
    Imported { import_path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCandidate {
    pub dir: PathBuf,
    pub origin: Origin,
    /// Requested explicitly, as opposed to injected
    pub root: bool,
}

impl PackageCandidate {
    pub fn from_manifest(dir: &Path, manifest: ManifestInfo, root: bool) -> Self {
        Self {
            dir: clean_path(dir),
            origin: Origin::Manifest(manifest),
            root,
        }
    }

    pub fn builtin(dir: &Path, rel_path: impl Into<String>) -> Self {
        Self {
            dir: clean_path(dir),
            origin: Origin::Builtin {
                rel_path: rel_path.into(),
            },
            root: false,
        }
    }

    pub fn imported(dir: &Path, import_path: impl Into<String>) -> Self {
        Self {
            dir: clean_path(dir),
            origin: Origin::Imported {
                import_path: import_path.into(),
            },
            root: false,
        }
    }

    pub fn id(&self) -> PackageId {
        match &self.origin {
            Origin::Builtin { rel_path } => PackageId::new(rel_path.clone()),
            Origin::Manifest(_) | Origin::Imported { .. } => {
                PackageId::new(self.dir.display().to_string())
            }
        }
    }

    pub fn pkg_path(&self) -> &str {
        match &self.origin {
            Origin::Manifest(info) => &info.module_path,
            Origin::Builtin { rel_path } => rel_path,
            Origin::Imported { import_path } => import_path,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.origin, Origin::Builtin { .. })
    }
}

pub trait PackageDiscoverer: Send + Sync {
    /// Stream candidates in a deterministic order.
    fn discover(&self) -> Box<dyn Iterator<Item = PackageCandidate> + Send + '_>;

    /// Name for logging.
    fn name(&self) -> &str;
}
