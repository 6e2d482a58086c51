//! Include parameter parsing and resolution

pub mod included;
pub mod resolver;
pub mod tree;

pub use included::{IncludedKey, IncludedSet};
pub use resolver::{IncludeResolver, ResolutionMode};
pub use tree::IncludeTree;
