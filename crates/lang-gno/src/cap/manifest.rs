use crate::GnoPlugin;
use crate::manifest::{GnoMod, MANIFEST_FILE};
use gnodriver_plugin::{BoxError, ManifestCap, ManifestInfo};
use std::path::Path;

impl ManifestCap for GnoPlugin {
    fn manifest_file_name(&self) -> &'static str {
        MANIFEST_FILE
    }

    fn read_manifest(&self, path: &Path, data: &str) -> Result<ManifestInfo, BoxError> {
        Ok(GnoMod::read(path, data)?.info())
    }
}
