use super::{PackageCandidate, PackageDiscoverer};
use crate::error::{DriverError, Result};
use gnodriver_plugin::{LanguageCaps, ManifestInfo};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walks a directory tree and yields every directory with a valid manifest.
///
/// Directories without a manifest are skipped silently, directories with a
/// malformed one are skipped with a warning. Either way the walk keeps
/// descending, so one broken package never hides its neighbours.
pub struct ManifestScanner {
    root: PathBuf,
    caps: LanguageCaps,
    mark_roots: bool,
}

impl ManifestScanner {
    pub fn new(root: impl Into<PathBuf>, caps: LanguageCaps) -> Self {
        Self {
            root: root.into(),
            caps,
            mark_roots: true,
        }
    }

    /// Candidates from this scanner are flagged as roots or not.
    pub fn with_roots(mut self, mark_roots: bool) -> Self {
        self.mark_roots = mark_roots;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidate_at(&self, dir: &Path) -> Option<PackageCandidate> {
        match read_manifest(dir, &self.caps) {
            Ok(Some(info)) => {
                debug!(dir = %dir.display(), module = %info.module_path, "found package");
                Some(PackageCandidate::from_manifest(dir, info, self.mark_roots))
            }
            Ok(None) => None,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping directory with invalid manifest");
                None
            }
        }
    }
}

impl PackageDiscoverer for ManifestScanner {
    fn discover(&self) -> Box<dyn Iterator<Item = PackageCandidate> + Send + '_> {
        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "scan root is not a directory");
            return Box::new(std::iter::empty());
        }

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => self.candidate_at(entry.path()),
                Ok(_) => None,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "failed to read directory");
                    None
                }
            });
        Box::new(walker)
    }

    fn name(&self) -> &str {
        "manifest"
    }
}

/// Read the manifest of `dir`.
///
/// `Ok(None)` when the directory has no manifest file at all; an error when
/// the file exists but cannot be read or does not validate.
pub fn read_manifest(dir: &Path, caps: &LanguageCaps) -> Result<Option<ManifestInfo>> {
    let manifest_path = dir.join(caps.manifest.manifest_file_name());
    if !manifest_path.is_file() {
        return Ok(None);
    }
    let data =
        std::fs::read_to_string(&manifest_path).map_err(|e| DriverError::load(&manifest_path, e))?;
    caps.manifest
        .read_manifest(&manifest_path, &data)
        .map(Some)
        .map_err(|e| DriverError::load(&manifest_path, e))
}
