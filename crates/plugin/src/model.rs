use serde::{Deserialize, Serialize};

/// Role of a file inside a package directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Primary source file, part of the package proper
    Primary,
    /// Unit test source (`_test` suffix)
    Test,
    /// File-based test source (`_filetest` suffix)
    FileTest,
    /// Hidden source file, never part of a package
    Hidden,
    /// Anything that is not a source file
    Other,
}

impl SourceKind {
    pub fn is_source(self) -> bool {
        matches!(
            self,
            SourceKind::Primary | SourceKind::Test | SourceKind::FileTest
        )
    }

    pub fn is_test(self) -> bool {
        matches!(self, SourceKind::Test | SourceKind::FileTest)
    }
}

/// Result of an imports-only scan of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub package_name: String,
    /// Import paths with their quotes removed, in source order
    pub imports: Vec<String>,
}

/// The parts of a per-directory manifest the driver relies on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInfo {
    pub module_path: String,
    pub draft: bool,
    pub requires: Vec<String>,
}
