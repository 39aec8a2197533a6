use super::registry::{Insertion, PackageRegistry};
use crate::discover::PackageCandidate;
use crate::error::{DriverError, Result};
use crate::extract::PackageMetadataExtractor;
use gnodriver_api::{DriverResponse, PackageDescriptor, PackageId};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Linked package graph of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedGraph {
    pub roots: Vec<PackageId>,
    pub packages: Vec<PackageDescriptor>,
}

impl ResolvedGraph {
    pub fn into_response(self) -> DriverResponse {
        DriverResponse {
            roots: self.roots,
            packages: self.packages,
        }
    }
}

/// Builds the package graph in two phases.
///
/// Phase 1 extracts every candidate independently on the worker pool.
/// Phase 2 starts once all of them are in the registry and links imports;
/// no package is loaded during linking.
pub struct GraphBuilder {
    extractor: PackageMetadataExtractor,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl GraphBuilder {
    pub fn new(extractor: PackageMetadataExtractor) -> Self {
        Self {
            extractor,
            pool: None,
        }
    }

    /// Use a dedicated pool of `jobs` threads instead of the global one.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Result<Self> {
        self.pool = match jobs {
            Some(n) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("gnodriver-extract-{i}"))
                    .build()
                    .map_err(|e| DriverError::Internal(e.to_string()))?,
            )),
            None => None,
        };
        Ok(self)
    }

    pub fn build(&self, candidates: Vec<PackageCandidate>) -> ResolvedGraph {
        let start = Instant::now();
        let candidates = dedup_candidates(candidates);

        // Phase 1: order-preserving parallel extraction.
        let extract = || -> Vec<Result<PackageDescriptor>> {
            candidates
                .par_iter()
                .map(|candidate| self.extractor.extract(candidate))
                .collect()
        };
        let extracted = match &self.pool {
            Some(pool) => pool.install(extract),
            None => extract(),
        };

        let mut registry = PackageRegistry::new();
        let mut roots = Vec::new();
        for (candidate, result) in candidates.iter().zip(extracted) {
            match result {
                Ok(pkg) => {
                    let id = pkg.id.clone();
                    if registry.insert(pkg) != Insertion::DuplicateId && candidate.root {
                        roots.push(id);
                    }
                }
                Err(e) => {
                    error!(dir = %candidate.dir.display(), error = %e, "failed to load package");
                }
            }
        }

        // Phase 2: link against the complete registry.
        let missed = registry.link_all();

        info!(
            candidates = candidates.len(),
            packages = registry.len(),
            roots = roots.len(),
            missed_imports = missed,
            elapsed = ?start.elapsed(),
            "built package graph"
        );

        ResolvedGraph {
            roots,
            packages: registry.into_packages(),
        }
    }
}

/// Collapse candidates sharing an ID into the first one, OR-ing root flags.
fn dedup_candidates(candidates: Vec<PackageCandidate>) -> Vec<PackageCandidate> {
    let mut by_id: IndexMap<PackageId, PackageCandidate> = IndexMap::new();
    for candidate in candidates {
        match by_id.get_mut(&candidate.id()) {
            Some(existing) => existing.root |= candidate.root,
            None => {
                by_id.insert(candidate.id(), candidate);
            }
        }
    }
    by_id.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnodriver_plugin::ManifestInfo;
    use std::path::Path;

    fn candidate(dir: &str, module: &str, root: bool) -> PackageCandidate {
        PackageCandidate::from_manifest(
            Path::new(dir),
            ManifestInfo {
                module_path: module.to_string(),
                ..ManifestInfo::default()
            },
            root,
        )
    }

    #[test]
    fn test_dedup_ors_root_flag() {
        let merged = dedup_candidates(vec![
            candidate("/w/a", "a", false),
            candidate("/w/b", "b", false),
            candidate("/w/a/", "a", true),
        ]);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].root);
        assert!(!merged[1].root);
    }
}
