use crate::model::SourceKind;
use std::path::Path;

pub trait FileMatcherCap: Send + Sync {
    /// Classify a file by name. Only the file name is inspected, the file
    /// is never opened.
    fn classify(&self, path: &Path) -> SourceKind;

    fn supports_path(&self, path: &Path) -> bool {
        self.classify(path).is_source()
    }
}
