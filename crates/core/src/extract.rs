//! Per-directory package metadata.
//!
//! Lists a package directory, runs the imports-only header scan over its
//! primary sources and folds the results into a [`PackageDescriptor`].

use crate::discover::PackageCandidate;
use crate::error::{DriverError, Result};
use gnodriver_api::{PackageDescriptor, PackageError};
use gnodriver_plugin::{LanguageCaps, SourceKind};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;
use xxhash_rust::xxh3::Xxh3;

/// Files of one directory, split by role and sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub sources: Vec<PathBuf>,
    pub others: Vec<PathBuf>,
}

impl DirectoryListing {
    /// Test sources are dropped; subdirectories are ignored.
    pub fn read(dir: &Path, caps: &LanguageCaps) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| DriverError::load(dir, e))? {
            let path = entry.map_err(|e| DriverError::load(dir, e))?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut listing = DirectoryListing::default();
        for path in files {
            match caps.matcher.classify(&path) {
                SourceKind::Primary => listing.sources.push(path),
                SourceKind::Other => listing.others.push(path),
                SourceKind::Test | SourceKind::FileTest | SourceKind::Hidden => {}
            }
        }
        Ok(listing)
    }

    /// Hash over the names and contents of every listed file.
    pub fn fingerprint(&self) -> Result<u64> {
        let mut hasher = Xxh3::new();
        for path in self.sources.iter().chain(&self.others) {
            let content = std::fs::read(path).map_err(|e| DriverError::load(path, e))?;
            hasher.update(path.as_os_str().as_encoded_bytes());
            hasher.update(&(content.len() as u64).to_le_bytes());
            hasher.update(&content);
        }
        Ok(hasher.digest())
    }
}

/// Majority vote over declared package names.
///
/// A name takes the lead only when its count strictly exceeds the current
/// leader's, so on a tie the name that reached the count first wins.
#[derive(Debug, Default)]
pub struct NameVote {
    counts: HashMap<String, usize>,
    best: Option<(String, usize)>,
}

impl NameVote {
    pub fn record(&mut self, name: &str) {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        let count = *count;
        if self.best.as_ref().is_none_or(|(_, best)| count > *best) {
            self.best = Some((name.to_string(), count));
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.best.as_ref().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub imports: BTreeSet<String>,
}

#[derive(Clone)]
pub struct PackageMetadataExtractor {
    caps: LanguageCaps,
}

impl PackageMetadataExtractor {
    pub fn new(caps: LanguageCaps) -> Self {
        Self { caps }
    }

    pub fn caps(&self) -> &LanguageCaps {
        &self.caps
    }

    /// Scan the headers of `files` in order. The first file that cannot be
    /// read or scanned fails the whole package.
    pub fn extract_files(&self, files: &[PathBuf]) -> Result<PackageMetadata> {
        let mut vote = NameVote::default();
        let mut imports = BTreeSet::new();

        for path in files {
            let source = std::fs::read_to_string(path).map_err(|e| DriverError::load(path, e))?;
            let header = self
                .caps
                .header
                .scan_header(&source, path)
                .map_err(|e| DriverError::load(path, e))?;
            vote.record(&header.package_name);
            imports.extend(header.imports);
        }

        Ok(PackageMetadata {
            name: vote.winner().unwrap_or_default().to_string(),
            imports,
        })
    }

    /// Build the unlinked descriptor of a candidate.
    pub fn extract(&self, candidate: &PackageCandidate) -> Result<PackageDescriptor> {
        let listing = DirectoryListing::read(&candidate.dir, &self.caps)?;
        self.extract_listing(candidate, &listing)
    }

    pub fn extract_listing(
        &self,
        candidate: &PackageCandidate,
        listing: &DirectoryListing,
    ) -> Result<PackageDescriptor> {
        let mut pkg = PackageDescriptor::new(candidate.id(), candidate.pkg_path());
        pkg.source_files = listing.sources.iter().map(|p| p.display().to_string()).collect();
        if !candidate.is_builtin() {
            pkg.other_files = listing.others.iter().map(|p| p.display().to_string()).collect();
        }

        if listing.sources.is_empty() {
            pkg.errors.push(PackageError::list(format!(
                "no Gno source files in {}",
                candidate.dir.display()
            )));
            return Ok(pkg);
        }

        let metadata = self.extract_files(&listing.sources)?;
        debug!(
            id = %pkg.id,
            name = %metadata.name,
            imports = ?metadata.imports,
            "analyzed sources"
        );
        pkg.name = metadata.name;
        pkg.raw_imports = metadata.imports;
        Ok(pkg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_vote_majority() {
        let mut vote = NameVote::default();
        for name in ["foo", "bar", "foo"] {
            vote.record(name);
        }
        assert_eq!(vote.winner(), Some("foo"));
    }

    #[test]
    fn test_name_vote_tie_keeps_first() {
        let mut vote = NameVote::default();
        for name in ["bar", "foo", "foo", "bar"] {
            vote.record(name);
        }
        assert_eq!(vote.winner(), Some("foo"));

        let mut vote = NameVote::default();
        vote.record("a");
        vote.record("b");
        assert_eq!(vote.winner(), Some("a"));
        assert_eq!(NameVote::default().winner(), None);
    }
}
