//! Format resolution: three-tier override chain over externally-maintained
//! format stores (product override, tenant custom, global standard).

pub mod registry;
pub mod resolver;
pub mod store;

pub use resolver::{resolve, ResolutionError, ResolvedFormat};
pub use store::{FormatStore, InMemoryFormatStore};
