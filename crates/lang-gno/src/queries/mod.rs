use tree_sitter::Query;

/// Capture indices of the header query, resolved once after loading.
#[derive(Debug, Clone, Copy)]
pub struct HeaderIndices {
    pub package_name: u32,
    pub import_path: u32,
}

impl HeaderIndices {
    pub fn new(query: &Query) -> Result<Self, crate::GnoError> {
        Ok(Self {
            package_name: capture_index(query, "package.name")?,
            import_path: capture_index(query, "import.path")?,
        })
    }
}

fn capture_index(query: &Query, name: &str) -> Result<u32, crate::GnoError> {
    query
        .capture_index_for_name(name)
        .ok_or_else(|| crate::GnoError::Query(format!("capture '{}' not found in SCM", name)))
}

pub const GNO_HEADER_SCM: &str = include_str!("gno_header.scm");
