use std::path::{Path, PathBuf};
use tracing::warn;

pub const GNOROOT_ENV: &str = "GNOROOT";

/// A validated Gno installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnoRoot(PathBuf);

impl GnoRoot {
    /// Accept `path` only if it is an existing directory.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Some(Self(crate::util::clean_path(path)))
        } else {
            warn!(
                root = %path.display(),
                "gno root is not a directory, examples and stdlibs are ignored"
            );
            None
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.0.join("examples")
    }

    pub fn stdlibs_dir(&self) -> PathBuf {
        self.0.join("gnovm").join("stdlibs")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoaderMode {
    /// Fresh resolution per request, no transitive loading
    #[default]
    Batch,
    /// Cached resolution with transitive loading and invalidation
    Resident,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverConfig {
    pub gno_root: Option<PathBuf>,
    pub mode: LoaderMode,
    /// Worker threads for package extraction, rayon's default when unset
    pub jobs: Option<usize>,
}

impl DriverConfig {
    pub fn from_env() -> Self {
        Self {
            gno_root: std::env::var_os(GNOROOT_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            ..Self::default()
        }
    }

    /// The configured root if it exists on disk. A missing root degrades
    /// to no examples and no stdlibs.
    pub fn resolve_gno_root(&self) -> Option<GnoRoot> {
        match &self.gno_root {
            Some(path) => GnoRoot::new(path),
            None => {
                warn!("can't find gno root, examples and std packages are ignored");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gno_root_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = GnoRoot::new(dir.path()).unwrap();
        assert_eq!(root.examples_dir(), root.path().join("examples"));
        assert!(root.stdlibs_dir().ends_with("gnovm/stdlibs"));
    }

    #[test]
    fn test_missing_root_degrades() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GnoRoot::new(dir.path().join("nope")).is_none());

        let config = DriverConfig {
            gno_root: Some(dir.path().join("nope")),
            ..DriverConfig::default()
        };
        assert!(config.resolve_gno_root().is_none());
        assert!(DriverConfig::default().resolve_gno_root().is_none());
    }
}
