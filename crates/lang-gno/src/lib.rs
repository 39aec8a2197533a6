pub mod cap;
pub mod error;
pub mod manifest;
pub mod parser;
pub mod queries;
pub mod source;

pub use cap::gno_caps;
pub use error::{GnoError, ManifestError};
pub use manifest::{GnoMod, MANIFEST_FILE};
pub use parser::GnoHeaderParser;

pub struct GnoPlugin {
    parser: GnoHeaderParser,
}

impl GnoPlugin {
    pub fn new() -> Result<Self, GnoError> {
        Ok(Self {
            parser: GnoHeaderParser::new()?,
        })
    }
}
