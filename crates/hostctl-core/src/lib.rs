mod paths;
pub mod types;

pub use paths::SystemPaths;
pub use types::*;
