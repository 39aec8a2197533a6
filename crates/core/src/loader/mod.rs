//! [`PackageLoader`](gnodriver_api::PackageLoader) implementations.
//!
//! [`BatchLoader`] rebuilds the whole graph from the patterns on every
//! discovery and never follows imports beyond what the patterns found.
//! [`ResidentLoader`] keeps packages in a [`ResolutionCache`](crate::cache::ResolutionCache)
//! and loads imports transitively.

mod batch;
mod resident;

pub use batch::BatchLoader;
pub use resident::ResidentLoader;
