use super::{CYCLE_ERROR_PREFIX, CacheEntry, CacheState};
use crate::config::GnoRoot;
use crate::discover::{PackageCandidate, read_manifest};
use crate::error::{DriverError, Result};
use crate::extract::{DirectoryListing, PackageMetadataExtractor};
use crate::util::to_slash;
use gnodriver_api::{PackageDescriptor, PackageError};
use petgraph::stable_graph::NodeIndex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One recursive resolution under the cache's write lock.
pub(super) struct Resolver<'a> {
    state: &'a mut CacheState,
    extractor: &'a PackageMetadataExtractor,
    gno_root: Option<&'a GnoRoot>,
    /// Packages currently being resolved, outermost first: (dir, pkg path)
    loading: Vec<(PathBuf, String)>,
}

impl<'a> Resolver<'a> {
    pub(super) fn new(
        state: &'a mut CacheState,
        extractor: &'a PackageMetadataExtractor,
        gno_root: Option<&'a GnoRoot>,
    ) -> Self {
        Self {
            state,
            extractor,
            gno_root,
            loading: Vec::new(),
        }
    }

    /// Fresh entries are returned as is; anything else is (re)loaded. A
    /// cached package that fails to reload is evicted.
    pub(super) fn resolve(&mut self, dir: &Path, reached_as: Option<&str>) -> Result<NodeIndex> {
        let existing = self.state.by_dir.get(dir).copied();
        if let Some(idx) = existing {
            if self.state.is_fresh(idx) {
                return Ok(idx);
            }
        }

        let result = self.load(dir, existing, reached_as);
        if let (Err(e), Some(idx)) = (&result, existing) {
            warn!(dir = %dir.display(), error = %e, "cached package no longer loads");
            self.state.evict(idx);
        }
        result
    }

    fn load(
        &mut self,
        dir: &Path,
        existing: Option<NodeIndex>,
        reached_as: Option<&str>,
    ) -> Result<NodeIndex> {
        let reached_as = reached_as
            .map(str::to_string)
            .or_else(|| existing.and_then(|idx| self.state.graph[idx].reached_as.clone()));

        let listing = DirectoryListing::read(dir, self.extractor.caps())?;
        let fingerprint = listing.fingerprint()?;

        let reusable = existing
            .map(|idx| &self.state.graph[idx])
            .filter(|entry| entry.fingerprint == fingerprint)
            .map(|entry| entry.pkg.clone());
        let mut pkg = match reusable {
            Some(mut pkg) => {
                debug!(dir = %dir.display(), "sources unchanged, re-validating imports");
                pkg.imports.clear();
                pkg.errors.retain(|e| !e.msg.starts_with(CYCLE_ERROR_PREFIX));
                pkg
            }
            None => {
                let candidate = self.candidate_for(dir, reached_as.as_deref())?;
                self.extractor.extract_listing(&candidate, &listing)?
            }
        };

        let entry = CacheEntry {
            dir: dir.to_path_buf(),
            pkg: pkg.clone(),
            generation: 0,
            fingerprint,
            reached_as: reached_as.clone(),
            missed: BTreeSet::new(),
        };
        let idx = match existing {
            Some(idx) => {
                self.state.clear_children(idx);
                let old_path = std::mem::replace(&mut self.state.graph[idx], entry).pkg.pkg_path;
                if old_path != pkg.pkg_path {
                    self.state.release_path(&old_path, idx);
                }
                idx
            }
            None => {
                let idx = self.state.graph.add_node(entry);
                self.state.by_dir.insert(dir.to_path_buf(), idx);
                idx
            }
        };
        self.state.claim_path(&pkg.pkg_path, idx);

        self.loading.push((dir.to_path_buf(), pkg.pkg_path.clone()));
        let missed = self.link_imports(idx, &mut pkg);
        self.loading.pop();

        let entry = &mut self.state.graph[idx];
        entry.pkg = pkg;
        entry.missed = missed;
        entry.generation = self.state.generation;
        Ok(idx)
    }

    /// Link every raw import of `pkg`. Returns the import paths that could
    /// not be located.
    fn link_imports(&mut self, idx: NodeIndex, pkg: &mut PackageDescriptor) -> BTreeSet<String> {
        let mut missed = BTreeSet::new();
        let raw: Vec<String> = pkg.raw_imports.iter().cloned().collect();
        for import_path in raw {
            let Some(target) = self.locate(&import_path) else {
                debug!(pkg = %pkg.id, path = %import_path, "missed import");
                missed.insert(import_path);
                continue;
            };

            if let Some(pos) = self.loading.iter().position(|(dir, _)| *dir == target) {
                let chain = self.loading[pos..]
                    .iter()
                    .map(|(_, path)| path.as_str())
                    .chain(std::iter::once(import_path.as_str()))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                warn!(pkg = %pkg.id, cycle = %chain, "import cycle");
                pkg.errors.push(PackageError::list(format!("{CYCLE_ERROR_PREFIX} {chain}")));
                continue;
            }

            match self.resolve(&target, Some(&import_path)) {
                Ok(child) if self.state.graph[child].pkg.pkg_path != import_path => {
                    debug!(
                        pkg = %pkg.id,
                        path = %import_path,
                        found = %self.state.graph[child].pkg.pkg_path,
                        "import resolves to a package with another path"
                    );
                    missed.insert(import_path);
                }
                Ok(child) => {
                    let child_id = self.state.graph[child].pkg.id.clone();
                    pkg.link(&import_path, child_id);
                    self.state.graph.update_edge(idx, child, ());
                }
                Err(e) => {
                    warn!(pkg = %pkg.id, path = %import_path, error = %e, "failed to load import");
                    missed.insert(import_path);
                }
            }
        }
        missed
    }

    /// Directory of the package an import path refers to.
    fn locate(&self, import_path: &str) -> Option<PathBuf> {
        if let Some(&idx) = self.state.by_path.get(import_path) {
            return Some(self.state.graph[idx].dir.clone());
        }

        self.state
            .import_candidates(self.gno_root, import_path)
            .into_iter()
            .find(|dir| dir.is_dir())
    }

    /// Decide how a directory gets its package path: manifest first, then
    /// position under the stdlibs root, then the import that reached it.
    fn candidate_for(&self, dir: &Path, reached_as: Option<&str>) -> Result<PackageCandidate> {
        if let Some(info) = read_manifest(dir, self.extractor.caps())? {
            return Ok(PackageCandidate::from_manifest(dir, info, false));
        }
        if let Some(root) = self.gno_root {
            if let Ok(rel) = dir.strip_prefix(root.stdlibs_dir()) {
                if rel.components().next().is_some() {
                    return Ok(PackageCandidate::builtin(dir, to_slash(rel)));
                }
            }
        }
        match reached_as {
            Some(import_path) => Ok(PackageCandidate::imported(dir, import_path)),
            None => Err(DriverError::load(dir, "cannot determine package path")),
        }
    }
}
