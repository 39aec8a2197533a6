use super::scanner::read_manifest;
use super::{PackageCandidate, PackageDiscoverer};
use crate::util::clean_path;
use gnodriver_plugin::LanguageCaps;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Finds the package that owns a single path: the closest directory at or
/// above it that holds a manifest.
///
/// A file's search starts at its parent directory. The search stops at the
/// first manifest found; if that manifest is invalid the path has no owner.
pub struct OwnerLookup {
    path: PathBuf,
    caps: LanguageCaps,
}

impl OwnerLookup {
    pub fn new(path: impl AsRef<Path>, caps: LanguageCaps) -> Self {
        Self {
            path: clean_path(path.as_ref()),
            caps,
        }
    }

    /// Directory the upward search starts from.
    pub fn start_dir(&self) -> &Path {
        if self.path.is_dir() {
            self.path.as_path()
        } else {
            self.path.parent().unwrap_or(self.path.as_path())
        }
    }

    pub fn find(&self) -> Option<PackageCandidate> {
        for dir in self.start_dir().ancestors() {
            match read_manifest(dir, &self.caps) {
                Ok(Some(info)) => return Some(PackageCandidate::from_manifest(dir, info, true)),
                Ok(None) => continue,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "owning package has an invalid manifest");
                    return None;
                }
            }
        }
        None
    }
}

impl PackageDiscoverer for OwnerLookup {
    fn discover(&self) -> Box<dyn Iterator<Item = PackageCandidate> + Send + '_> {
        Box::new(self.find().into_iter())
    }

    fn name(&self) -> &str {
        "owner"
    }
}
