//! Generation-counted package cache for the resident loader.
//!
//! Every loaded package is a node of a directed graph; an edge runs from an
//! importer to the package it imports. Each node carries the generation at
//! which it was last resolved and is fresh only while that stamp equals the
//! cache's current generation.
//!
//! Invalidating a path bumps the generation, leaves the owning package and
//! all of its transitive importers stale, and re-stamps everything else so
//! it stays fresh. Stale packages are re-resolved on the next access.

mod resolve;

use crate::config::GnoRoot;
use crate::error::Result;
use crate::extract::PackageMetadataExtractor;
use crate::util::clean_path;
use gnodriver_api::{PackageDescriptor, PackageId};
use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use resolve::Resolver;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

pub const CYCLE_ERROR_PREFIX: &str = "import cycle not allowed:";

#[derive(Debug, Clone)]
struct CacheEntry {
    dir: PathBuf,
    pkg: PackageDescriptor,
    generation: u64,
    /// Hash over the directory's files when `pkg` was extracted
    fingerprint: u64,
    /// Import path the package was first reached by, if any
    reached_as: Option<String>,
    /// Imports that could not be located at the last resolution
    missed: BTreeSet<String>,
}

#[derive(Debug)]
struct CacheState {
    graph: StableDiGraph<CacheEntry, ()>,
    by_dir: IndexMap<PathBuf, NodeIndex>,
    by_path: HashMap<String, NodeIndex>,
    generation: u64,
    search_roots: Vec<PathBuf>,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            graph: StableDiGraph::new(),
            by_dir: IndexMap::new(),
            by_path: HashMap::new(),
            // New nodes start at 0, so they are never fresh before resolution ends.
            generation: 1,
            search_roots: Vec::new(),
        }
    }
}

impl CacheState {
    fn is_fresh(&self, idx: NodeIndex) -> bool {
        self.graph[idx].generation == self.generation
    }

    /// Cached package whose directory is the closest ancestor-or-self of `path`.
    fn owner_of(&self, path: &Path) -> Option<NodeIndex> {
        self.by_dir
            .iter()
            .filter(|(dir, _)| path.starts_with(dir))
            .max_by_key(|(dir, _)| dir.components().count())
            .map(|(_, idx)| *idx)
    }

    /// First package to claim a path keeps it as the import target.
    fn claim_path(&mut self, pkg_path: &str, idx: NodeIndex) {
        match self.by_path.get(pkg_path) {
            Some(&owner) if owner != idx => {
                warn!(
                    pkg_path,
                    kept = %self.graph[owner].dir.display(),
                    shadowed = %self.graph[idx].dir.display(),
                    "duplicate package path"
                );
            }
            Some(_) => {}
            None => {
                self.by_path.insert(pkg_path.to_string(), idx);
            }
        }
    }

    /// Forget `pkg_path` as an import target if `idx` owns it.
    fn release_path(&mut self, pkg_path: &str, idx: NodeIndex) {
        if self.by_path.get(pkg_path) == Some(&idx) {
            debug!(pkg_path, "released package path");
            self.by_path.remove(pkg_path);
        }
    }

    /// Directories an import path may live in, in lookup order: stdlibs,
    /// examples, then the extra search roots. Paths escaping their root are
    /// rejected.
    fn import_candidates(&self, gno_root: Option<&GnoRoot>, import_path: &str) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Some(root) = gno_root {
            roots.push(root.stdlibs_dir());
            roots.push(root.examples_dir());
        }
        roots.extend(self.search_roots.iter().cloned());

        roots
            .into_iter()
            .filter_map(|root| {
                let dir = clean_path(&root.join(import_path));
                (dir != root && dir.starts_with(&root)).then_some(dir)
            })
            .collect()
    }

    /// Packages with a missed import that `path` could now satisfy.
    fn missing_importers(&self, gno_root: Option<&GnoRoot>, path: &Path) -> Vec<NodeIndex> {
        self.by_dir
            .values()
            .copied()
            .filter(|&idx| {
                self.graph[idx].missed.iter().any(|import_path| {
                    self.import_candidates(gno_root, import_path)
                        .iter()
                        .any(|dir| path.starts_with(dir) || dir.starts_with(path))
                })
            })
            .collect()
    }

    fn clear_children(&mut self, idx: NodeIndex) {
        let edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for edge in edges {
            self.graph.remove_edge(edge);
        }
    }

    /// The node plus every transitive importer of it.
    fn with_ancestors(&self, idx: NodeIndex) -> HashSet<NodeIndex> {
        let mut seen = HashSet::from([idx]);
        let mut queue = VecDeque::from([idx]);
        while let Some(current) = queue.pop_front() {
            for parent in self.graph.neighbors_directed(current, Direction::Incoming) {
                if seen.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }
        seen
    }

    /// Drop a package that can no longer be loaded. Its importers go stale.
    fn evict(&mut self, idx: NodeIndex) {
        let parents: Vec<_> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        for parent in parents {
            self.graph[parent].generation = 0;
        }
        if let Some(entry) = self.graph.remove_node(idx) {
            debug!(dir = %entry.dir.display(), "evicted package");
            self.by_dir.shift_remove(&entry.dir);
        }
        self.by_path.retain(|_, owner| *owner != idx);
    }
}

pub struct ResolutionCache {
    state: RwLock<CacheState>,
    extractor: PackageMetadataExtractor,
    gno_root: Option<GnoRoot>,
}

impl ResolutionCache {
    pub fn new(extractor: PackageMetadataExtractor, gno_root: Option<GnoRoot>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            extractor,
            gno_root,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn len(&self) -> usize {
        self.read().by_dir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extra directory to look for imported packages in, after the stdlibs
    /// and examples roots.
    pub fn add_search_root(&self, root: &Path) {
        let root = clean_path(root);
        let mut state = self.write();
        if !state.search_roots.contains(&root) {
            state.search_roots.push(root);
        }
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.read().by_dir.contains_key(&clean_path(dir))
    }

    /// Whether the package at `dir` is cached and current. Unknown
    /// directories are not fresh.
    pub fn is_fresh(&self, dir: &Path) -> bool {
        let state = self.read();
        state
            .by_dir
            .get(&clean_path(dir))
            .is_some_and(|&idx| state.is_fresh(idx))
    }

    pub fn get(&self, dir: &Path) -> Option<PackageDescriptor> {
        let state = self.read();
        state
            .by_dir
            .get(&clean_path(dir))
            .map(|&idx| state.graph[idx].pkg.clone())
    }

    /// Directories of the packages imported by the package at `dir`.
    pub fn children(&self, dir: &Path) -> Vec<PathBuf> {
        self.neighbors(dir, Direction::Outgoing)
    }

    /// Directories of the packages importing the package at `dir`.
    pub fn parents(&self, dir: &Path) -> Vec<PathBuf> {
        self.neighbors(dir, Direction::Incoming)
    }

    fn neighbors(&self, dir: &Path, direction: Direction) -> Vec<PathBuf> {
        let state = self.read();
        let Some(&idx) = state.by_dir.get(&clean_path(dir)) else {
            return Vec::new();
        };
        let mut dirs: Vec<_> = state
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| state.graph[n].dir.clone())
            .collect();
        dirs.sort();
        dirs
    }

    /// Resolve the package at `dir` and, transitively, everything it imports.
    pub fn load(&self, dir: &Path) -> Result<PackageId> {
        let dir = clean_path(dir);
        let mut state = self.write();
        let mut resolver = Resolver::new(&mut state, &self.extractor, self.gno_root.as_ref());
        let idx = resolver.resolve(&dir, None)?;
        Ok(state.graph[idx].pkg.id.clone())
    }

    /// Mark the package owning `path` and all of its importers stale, along
    /// with packages whose missed imports `path` may now provide. Returns
    /// the directories that went stale.
    pub fn invalidate(&self, path: &Path) -> Vec<PathBuf> {
        let path = clean_path(path);
        let mut state = self.write();
        let previous = state.generation;
        state.generation += 1;

        let mut stale = match state.owner_of(&path) {
            Some(idx) => state.with_ancestors(idx),
            None => HashSet::new(),
        };
        for idx in state.missing_importers(self.gno_root.as_ref(), &path) {
            stale.extend(state.with_ancestors(idx));
        }

        let generation = state.generation;
        let indices: Vec<_> = state.graph.node_indices().collect();
        for idx in indices {
            let entry = &mut state.graph[idx];
            if !stale.contains(&idx) && entry.generation == previous {
                entry.generation = generation;
            }
        }

        let mut dirs: Vec<_> = stale
            .iter()
            .map(|&idx| state.graph[idx].dir.clone())
            .collect();
        dirs.sort();
        info!(
            path = %path.display(),
            generation,
            stale = dirs.len(),
            "invalidated packages"
        );
        dirs
    }

    /// Re-resolve every stale package. Packages that fail to load are
    /// dropped from the cache. Returns how many packages were refreshed.
    pub fn refresh_stale(&self) -> usize {
        let mut state = self.write();
        let stale: Vec<PathBuf> = state
            .by_dir
            .iter()
            .filter(|&(_, &idx)| !state.is_fresh(idx))
            .map(|(dir, _)| dir.clone())
            .collect();

        for dir in &stale {
            // Resolving an importer re-resolves its stale imports too.
            if state.by_dir.get(dir).is_none_or(|&idx| state.is_fresh(idx)) {
                continue;
            }
            let mut resolver = Resolver::new(&mut state, &self.extractor, self.gno_root.as_ref());
            if let Err(e) = resolver.resolve(dir, None) {
                warn!(dir = %dir.display(), error = %e, "failed to refresh package");
            }
        }

        stale
            .iter()
            .filter(|dir| state.by_dir.get(*dir).is_some_and(|&idx| state.is_fresh(idx)))
            .count()
    }

    /// Every cached package in load order.
    pub fn packages(&self) -> Vec<PackageDescriptor> {
        let state = self.read();
        state
            .by_dir
            .values()
            .map(|&idx| state.graph[idx].pkg.clone())
            .collect()
    }
}
