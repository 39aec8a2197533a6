mod builder;
mod registry;

pub use builder::{GraphBuilder, ResolvedGraph};
pub use registry::{Insertion, PackageRegistry};
