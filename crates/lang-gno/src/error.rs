use thiserror::Error;

#[derive(Error, Debug)]
pub enum GnoError {
    #[error("Failed to load Go grammar: {0}")]
    Language(String),
    #[error("Invalid query: {0}")]
    Query(String),
    #[error("{path}:{line}:{column}: {msg}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
        msg: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("{path}:{line}: {msg}")]
    Parse {
        path: String,
        line: usize,
        msg: String,
    },
    #[error("{path}: {msg}")]
    Invalid { path: String, msg: String },
}
