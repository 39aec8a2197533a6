use super::{PackageCandidate, PackageDiscoverer};
use crate::util::{clean_path, to_slash};
use gnodriver_plugin::{LanguageCaps, SourceKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Synthesizes candidates for the built-in library.
///
/// Every directory under the root that holds at least one primary source
/// file is a package, whether or not it has a manifest. Its ID and package
/// path are both the `/`-separated path relative to the root.
pub struct StdlibDiscoverer {
    root: PathBuf,
    caps: LanguageCaps,
}

impl StdlibDiscoverer {
    pub fn new(root: impl AsRef<Path>, caps: LanguageCaps) -> Self {
        Self {
            root: clean_path(root.as_ref()),
            caps,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn has_primary_sources(&self, dir: &Path) -> bool {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read stdlib directory");
                return false;
            }
        };
        entries.flatten().any(|entry| {
            let path = entry.path();
            path.is_file() && self.caps.matcher.classify(&path) == SourceKind::Primary
        })
    }
}

impl PackageDiscoverer for StdlibDiscoverer {
    fn discover(&self) -> Box<dyn Iterator<Item = PackageCandidate> + Send + '_> {
        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "stdlibs root not found, skipping injection");
            return Box::new(std::iter::empty());
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| {
                let entry = entry
                    .map_err(|e| warn!(error = %e, "failed to walk stdlibs"))
                    .ok()?;
                if !entry.file_type().is_dir() || !self.has_primary_sources(entry.path()) {
                    return None;
                }
                let rel = entry.path().strip_prefix(&self.root).ok()?;
                let rel_path = to_slash(rel);
                debug!(path = %rel_path, "injecting stdlib");
                Some(PackageCandidate::builtin(entry.path(), rel_path))
            });
        Box::new(walker)
    }

    fn name(&self) -> &str {
        "stdlib"
    }
}
