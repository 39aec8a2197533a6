use crate::GnoPlugin;
use gnodriver_plugin::{FileMatcherCap, SourceKind};
use std::path::Path;

impl FileMatcherCap for GnoPlugin {
    fn classify(&self, path: &Path) -> SourceKind {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(crate::source::classify)
            .unwrap_or(SourceKind::Other)
    }
}
