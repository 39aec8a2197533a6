pub mod header;
pub mod manifest;
pub mod matcher;

pub use header::*;
pub use manifest::*;
pub use matcher::*;
