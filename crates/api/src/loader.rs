use crate::ApiResult;
use crate::models::{PackageDescriptor, PackageId};
use std::path::Path;

/// Capability interface shared by every package loading strategy.
///
/// Implementations range from a one-shot batch resolver, which rebuilds the
/// whole package graph on each discovery, to a resident resolver that keeps
/// descriptors alive between requests and re-resolves only what changed.
pub trait PackageLoader: Send + Sync {
    /// Resolve the given query patterns and return the IDs of the root packages.
    fn discover(&self, patterns: &[String]) -> ApiResult<Vec<PackageId>>;

    /// Notify the loader that something at `path` changed on disk.
    fn refresh(&self, path: &Path) -> ApiResult<()>;

    /// All descriptors currently known to the loader, in a stable order.
    fn list(&self) -> ApiResult<Vec<PackageDescriptor>>;
}
