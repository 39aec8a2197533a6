use crate::config::GnoRoot;
use crate::discover::{PackageDiscoverer, StdlibDiscoverer};
use crate::error::Result;
use crate::extract::PackageMetadataExtractor;
use crate::graph::{GraphBuilder, ResolvedGraph};
use crate::pattern::PatternResolver;
use gnodriver_api::{ApiResult, PackageDescriptor, PackageId, PackageLoader};
use gnodriver_plugin::LanguageCaps;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Stateless resolution: stdlibs, then every pattern's packages, linked
/// against each other and nothing else.
pub struct BatchLoader {
    caps: LanguageCaps,
    resolver: PatternResolver,
    stdlib: Option<StdlibDiscoverer>,
    builder: GraphBuilder,
    last: RwLock<Option<(Vec<String>, ResolvedGraph)>>,
}

impl BatchLoader {
    pub fn new(caps: LanguageCaps, gno_root: Option<GnoRoot>, jobs: Option<usize>) -> Result<Self> {
        let stdlib = gno_root
            .as_ref()
            .map(|root| StdlibDiscoverer::new(root.stdlibs_dir(), caps.clone()));
        let builder =
            GraphBuilder::new(PackageMetadataExtractor::new(caps.clone())).with_jobs(jobs)?;
        Ok(Self {
            caps,
            resolver: PatternResolver::new(gno_root),
            stdlib,
            builder,
            last: RwLock::new(None),
        })
    }

    /// Run the full pipeline for `patterns`.
    pub fn resolve(&self, patterns: &[String]) -> ResolvedGraph {
        let mut candidates = Vec::new();
        if let Some(stdlib) = &self.stdlib {
            candidates.extend(stdlib.discover());
        }
        let injected = candidates.len();

        for target in self.resolver.resolve(patterns) {
            candidates.extend(target.candidates(&self.caps));
        }
        info!(
            stdlibs = injected,
            discovered = candidates.len() - injected,
            "discovered packages"
        );

        self.builder.build(candidates)
    }
}

impl PackageLoader for BatchLoader {
    fn discover(&self, patterns: &[String]) -> ApiResult<Vec<PackageId>> {
        let graph = self.resolve(patterns);
        let roots = graph.roots.clone();
        *self.last.write().unwrap_or_else(PoisonError::into_inner) =
            Some((patterns.to_vec(), graph));
        Ok(roots)
    }

    fn refresh(&self, path: &Path) -> ApiResult<()> {
        let patterns = self
            .last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(patterns, _)| patterns.clone());
        if let Some(patterns) = patterns {
            info!(path = %path.display(), "re-running discovery");
            self.discover(&patterns)?;
        }
        Ok(())
    }

    fn list(&self) -> ApiResult<Vec<PackageDescriptor>> {
        Ok(self
            .last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, graph)| graph.packages.clone())
            .unwrap_or_default())
    }
}
