pub mod id;
pub mod version;

pub use id::ModId;
pub use version::{SemanticVersion, VersionParseError};
