pub mod cache;
pub mod config;
pub mod discover;
pub mod driver;
pub mod error;
pub mod extract;
pub mod graph;
pub mod loader;
pub mod logging;
pub mod pattern;
pub mod util;

pub use config::{DriverConfig, GnoRoot, LoaderMode};
pub use driver::Driver;
pub use error::{DriverError, Result};
pub use loader::{BatchLoader, ResidentLoader};
