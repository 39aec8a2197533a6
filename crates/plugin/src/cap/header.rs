use crate::BoxError;
use crate::model::FileHeader;
use std::path::Path;

/// Imports-only syntactic scan of a single source file.
///
/// Implementations read the package clause and the import declarations and
/// stop there; anything after the import block is never examined.
pub trait HeaderScanCap: Send + Sync {
    fn scan_header(&self, source: &str, path: &Path) -> Result<FileHeader, BoxError>;
}
