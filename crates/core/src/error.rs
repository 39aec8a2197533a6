use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to load package at {path}: {msg}")]
    Load { path: String, msg: String },
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriverError {
    pub fn load(path: impl AsRef<std::path::Path>, msg: impl std::fmt::Display) -> Self {
        DriverError::Load {
            path: path.as_ref().display().to_string(),
            msg: msg.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
