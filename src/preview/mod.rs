//! Preview of unsaved edits
//!
//! A preview renders a resource as it currently exists in memory, including
//! relationships that have not been saved yet. Previews are never cacheable.

pub mod service;
pub mod settings;

pub use service::{PreviewDocument, PreviewService};
pub use settings::PreviewSettings;
