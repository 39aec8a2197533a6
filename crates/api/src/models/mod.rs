pub mod language;
pub mod package;
pub mod protocol;
pub mod util;

pub use language::*;
pub use package::*;
pub use protocol::*;
