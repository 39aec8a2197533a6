mod header;
mod manifest;
mod matcher;
mod registration;

pub use registration::gno_caps;
