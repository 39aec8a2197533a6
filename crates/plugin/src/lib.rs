pub mod cap;
pub mod model;
pub mod registration;

pub use cap::*;
pub use model::*;
pub use registration::LanguageCaps;

/// Error type for capability operations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
