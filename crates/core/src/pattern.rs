//! Query patterns.
//!
//! `dir/...` (or a bare `...`) asks for every package under `dir`,
//! `file=path` asks for the package owning `path`. Anything else is
//! skipped with a warning.

use crate::config::GnoRoot;
use crate::discover::{ManifestScanner, OwnerLookup, PackageCandidate, PackageDiscoverer};
use crate::util::clean_path;
use gnodriver_plugin::LanguageCaps;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RECURSIVE: &str = "...";
const FILE_PREFIX: &str = "file=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Recursive(PathBuf),
    File(PathBuf),
    Unknown(String),
}

impl Pattern {
    pub fn parse(raw: &str) -> Self {
        if let Some(path) = raw.strip_prefix(FILE_PREFIX) {
            return Pattern::File(PathBuf::from(path));
        }
        if raw == RECURSIVE {
            return Pattern::Recursive(PathBuf::from("."));
        }
        match raw.strip_suffix(RECURSIVE).and_then(|dir| dir.strip_suffix('/')) {
            Some("") => Pattern::Recursive(PathBuf::from("/")),
            Some(dir) => Pattern::Recursive(PathBuf::from(dir)),
            None => Pattern::Unknown(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Every package below a directory
    Tree(PathBuf),
    /// The one package owning a path
    Owner(PathBuf),
}

/// A concrete scan derived from one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub pattern: String,
    pub kind: TargetKind,
    /// Added by the resolver rather than requested; its packages are not roots
    pub injected: bool,
}

impl ScanTarget {
    pub fn discoverer(&self, caps: &LanguageCaps) -> Box<dyn PackageDiscoverer> {
        match &self.kind {
            TargetKind::Tree(dir) => {
                Box::new(ManifestScanner::new(dir.clone(), caps.clone()).with_roots(!self.injected))
            }
            TargetKind::Owner(path) => Box::new(OwnerLookup::new(path, caps.clone())),
        }
    }

    /// Directory under which the target looks for packages.
    pub fn search_root(&self) -> &Path {
        match &self.kind {
            TargetKind::Tree(dir) => dir,
            TargetKind::Owner(path) => path.parent().unwrap_or(path.as_path()),
        }
    }

    /// Run the target's discoverer.
    pub fn candidates(&self, caps: &LanguageCaps) -> Vec<PackageCandidate> {
        let discoverer = self.discoverer(caps);
        let found: Vec<_> = discoverer.discover().collect();
        if matches!(self.kind, TargetKind::Owner(_)) && found.len() != 1 {
            warn!(
                arg = %self.pattern,
                count = found.len(),
                "unexpected number of packages"
            );
        }
        info!(
            arg = %self.pattern,
            discoverer = discoverer.name(),
            count = found.len(),
            "resolved pattern"
        );
        found
    }
}

pub struct PatternResolver {
    gno_root: Option<GnoRoot>,
}

impl PatternResolver {
    pub fn new(gno_root: Option<GnoRoot>) -> Self {
        Self { gno_root }
    }

    /// Turn patterns into scan targets, in pattern order, followed by the
    /// examples tree when a gno root is known.
    pub fn resolve(&self, patterns: &[String]) -> Vec<ScanTarget> {
        let mut targets = Vec::with_capacity(patterns.len() + 1);
        for raw in patterns {
            let kind = match Pattern::parse(raw) {
                Pattern::Recursive(dir) => TargetKind::Tree(clean_path(&dir)),
                Pattern::File(path) => TargetKind::Owner(clean_path(&path)),
                Pattern::Unknown(value) => {
                    warn!(value = %value, "unknown arg shape");
                    continue;
                }
            };
            targets.push(ScanTarget {
                pattern: raw.clone(),
                kind,
                injected: false,
            });
        }

        if let Some(root) = &self.gno_root {
            let examples = root.examples_dir();
            targets.push(ScanTarget {
                pattern: format!("{}/{}", examples.display(), RECURSIVE),
                kind: TargetKind::Tree(examples),
                injected: true,
            });
        }

        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        assert_eq!(
            Pattern::parse("./pkgs/..."),
            Pattern::Recursive(PathBuf::from("./pkgs"))
        );
        assert_eq!(Pattern::parse("..."), Pattern::Recursive(PathBuf::from(".")));
        assert_eq!(Pattern::parse("/..."), Pattern::Recursive(PathBuf::from("/")));
        assert_eq!(
            Pattern::parse("file=/work/a/a.gno"),
            Pattern::File(PathBuf::from("/work/a/a.gno"))
        );
        assert_eq!(
            Pattern::parse("gno.land/p/demo/avl"),
            Pattern::Unknown("gno.land/p/demo/avl".to_string())
        );
        assert_eq!(
            Pattern::parse("pkgs..."),
            Pattern::Unknown("pkgs...".to_string())
        );
    }

    #[test]
    fn test_resolve_skips_unknown_and_injects_examples() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PatternResolver::new(GnoRoot::new(dir.path()));
        let targets = resolver.resolve(&[
            "/work/...".to_string(),
            "bogus".to_string(),
            "file=/work/a/a.gno".to_string(),
        ]);

        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].kind, TargetKind::Tree(PathBuf::from("/work")));
        assert!(!targets[0].injected);
        assert_eq!(
            targets[1].kind,
            TargetKind::Owner(PathBuf::from("/work/a/a.gno"))
        );
        assert_eq!(targets[1].search_root(), Path::new("/work/a"));
        assert!(targets[2].injected);
        assert!(targets[2].search_root().ends_with("examples"));
    }

    #[test]
    fn test_resolve_without_root() {
        let resolver = PatternResolver::new(None);
        assert!(resolver.resolve(&[]).is_empty());
    }
}
