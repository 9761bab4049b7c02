mod loader;
mod model;
pub mod op_path;
mod registry;

pub use loader::load_source;
pub use model::{ResolvedOperation, SourceDocument};
pub use registry::{SourceError, SourceRegistry};
