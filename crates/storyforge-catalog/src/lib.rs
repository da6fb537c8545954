//! StoryForge — Framework Catalog context.
//!
//! The catalog is a static, in-memory list of narrative frameworks loaded at
//! startup from an embedded YAML document. It is never mutated at runtime.

mod catalog;
mod framework;

pub use catalog::Catalog;
pub use framework::{Framework, Stage};
