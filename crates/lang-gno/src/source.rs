use gnodriver_plugin::SourceKind;

pub const SOURCE_EXTENSION: &str = ".gno";
pub const TEST_SUFFIX: &str = "_test.gno";
pub const FILETEST_SUFFIX: &str = "_filetest.gno";

/// Classify a file by its name alone.
pub fn classify(file_name: &str) -> SourceKind {
    if !file_name.ends_with(SOURCE_EXTENSION) {
        return SourceKind::Other;
    }
    if file_name.starts_with('.') {
        SourceKind::Hidden
    } else if file_name.ends_with(FILETEST_SUFFIX) {
        SourceKind::FileTest
    } else if file_name.ends_with(TEST_SUFFIX) {
        SourceKind::Test
    } else {
        SourceKind::Primary
    }
}
