use crate::GnoPlugin;
use gnodriver_plugin::{BoxError, FileHeader, HeaderScanCap};
use std::path::Path;

impl HeaderScanCap for GnoPlugin {
    fn scan_header(&self, source: &str, path: &Path) -> Result<FileHeader, BoxError> {
        Ok(self.parser.scan(source, path)?)
    }
}
