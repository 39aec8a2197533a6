pub mod error;
pub mod loader;
pub mod models;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use loader::PackageLoader;
pub use models::*;
