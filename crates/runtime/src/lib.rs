use gnodriver_api::PackageLoader;
use gnodriver_core::{BatchLoader, Driver, DriverConfig, LoaderMode, ResidentLoader};

/// Error type for driver bootstrap
pub type BootstrapError = Box<dyn std::error::Error + Send + Sync>;

/// Assembles a driver with the Gno capabilities and the loader selected by
/// `config`.
pub fn build_default_driver(config: &DriverConfig) -> Result<Driver, BootstrapError> {
    let caps = gnodriver_gno::gno_caps()?;
    let gno_root = config.resolve_gno_root();

    let loader: Box<dyn PackageLoader> = match config.mode {
        LoaderMode::Batch => Box::new(BatchLoader::new(caps, gno_root, config.jobs)?),
        LoaderMode::Resident => Box::new(ResidentLoader::new(caps, gno_root)),
    };
    tracing::debug!(mode = ?config.mode, jobs = ?config.jobs, "driver ready");

    Ok(Driver::new(loader))
}

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module.
pub fn init_logging(component: &str) -> Option<impl Drop> {
    gnodriver_core::logging::init_logging(component)
}
