use crate::BoxError;
use crate::model::ManifestInfo;
use std::path::Path;

pub trait ManifestCap: Send + Sync {
    /// Fixed name of the per-directory manifest file.
    fn manifest_file_name(&self) -> &'static str;

    /// Parse, sanitize and validate a manifest. Any error means the
    /// directory must not be treated as a package.
    fn read_manifest(&self, path: &Path, data: &str) -> Result<ManifestInfo, BoxError>;
}
