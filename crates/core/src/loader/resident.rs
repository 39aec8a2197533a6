use crate::cache::ResolutionCache;
use crate::config::GnoRoot;
use crate::extract::PackageMetadataExtractor;
use crate::pattern::PatternResolver;
use gnodriver_api::{ApiResult, PackageDescriptor, PackageId, PackageLoader};
use gnodriver_plugin::LanguageCaps;
use std::path::Path;
use tracing::{info, warn};

/// Cached resolution that follows imports transitively.
///
/// Only packages matched by explicit patterns are loaded up front; the
/// examples tree and the stdlibs are searched lazily when an import needs
/// them.
pub struct ResidentLoader {
    caps: LanguageCaps,
    resolver: PatternResolver,
    cache: ResolutionCache,
}

impl ResidentLoader {
    pub fn new(caps: LanguageCaps, gno_root: Option<GnoRoot>) -> Self {
        let cache =
            ResolutionCache::new(PackageMetadataExtractor::new(caps.clone()), gno_root.clone());
        Self {
            caps,
            resolver: PatternResolver::new(gno_root),
            cache,
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }
}

impl PackageLoader for ResidentLoader {
    fn discover(&self, patterns: &[String]) -> ApiResult<Vec<PackageId>> {
        let mut roots: Vec<PackageId> = Vec::new();
        for target in self.resolver.resolve(patterns) {
            if target.injected {
                continue;
            }
            self.cache.add_search_root(target.search_root());
            for candidate in target.candidates(&self.caps) {
                match self.cache.load(&candidate.dir) {
                    Ok(id) if !roots.contains(&id) => roots.push(id),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(dir = %candidate.dir.display(), error = %e, "failed to load package")
                    }
                }
            }
        }
        info!(
            roots = roots.len(),
            cached = self.cache.len(),
            generation = self.cache.generation(),
            "resolved patterns"
        );
        Ok(roots)
    }

    fn refresh(&self, path: &Path) -> ApiResult<()> {
        self.cache.invalidate(path);
        Ok(())
    }

    fn list(&self) -> ApiResult<Vec<PackageDescriptor>> {
        let refreshed = self.cache.refresh_stale();
        if refreshed > 0 {
            info!(refreshed, "re-resolved stale packages");
        }
        Ok(self.cache.packages())
    }
}
