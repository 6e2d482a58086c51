//! Resource loader implementations

pub mod in_memory;

pub use in_memory::InMemoryResourceLoader;
