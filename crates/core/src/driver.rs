//! One request/response exchange of the external package driver protocol.

use crate::error::{DriverError, Result};
use gnodriver_api::{DriverRequest, DriverResponse, PackageLoader};
use std::io::{Read, Write};
use tracing::{debug, error, info};

pub struct Driver {
    loader: Box<dyn PackageLoader>,
    /// Patterns from the command line, appended to the request's own
    extra_patterns: Vec<String>,
}

impl Driver {
    pub fn new(loader: Box<dyn PackageLoader>) -> Self {
        Self {
            loader,
            extra_patterns: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.extra_patterns.extend(patterns);
        self
    }

    /// Parse a request from `input`, resolve it and write the response to
    /// `output`. Only failing to read, parse or write aborts; loading
    /// problems shrink the response instead.
    pub fn serve<R: Read, W: Write>(&self, mut input: R, mut output: W) -> Result<()> {
        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|e| DriverError::Protocol(format!("failed to read request: {e}")))?;
        let request: DriverRequest = serde_json::from_slice(&bytes)
            .map_err(|e| DriverError::Protocol(format!("failed to unmarshal request: {e}")))?;

        let response = self.handle(&request);

        serde_json::to_writer(&mut output, &response)
            .map_err(|e| DriverError::Protocol(format!("failed to marshal response: {e}")))?;
        output
            .flush()
            .map_err(|e| DriverError::Protocol(format!("failed to write response: {e}")))?;

        info!(
            roots = response.roots.len(),
            packages = response.packages.len(),
            "success"
        );
        Ok(())
    }

    pub fn handle(&self, request: &DriverRequest) -> DriverResponse {
        let patterns: Vec<String> = request
            .patterns
            .iter()
            .chain(&self.extra_patterns)
            .cloned()
            .collect();

        info!(
            mode = %request.mode,
            tests = request.tests,
            build_flags = ?request.build_flags,
            overlay = ?request.overlay.keys().collect::<Vec<_>>(),
            patterns = ?patterns,
            "unmarshalled request"
        );
        debug!(env = request.env.len(), "environment is not interpreted");
        if request.tests {
            debug!("test variants are not produced");
        }

        let roots = self.loader.discover(&patterns).unwrap_or_else(|e| {
            error!(error = %e, "failed to discover packages");
            Vec::new()
        });
        let packages = self.loader.list().unwrap_or_else(|e| {
            error!(error = %e, "failed to list packages");
            Vec::new()
        });

        DriverResponse { roots, packages }
    }
}
