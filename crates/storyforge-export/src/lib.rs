//! StoryForge — Document export.
//!
//! Pure formatting over already-validated data: a format-independent block
//! model built from a project and its framework, rendered to Markdown or
//! plain text.

mod document;
mod options;

pub use document::{ExportFormat, export_filename, render, safe_filename};
pub use options::ExportOptions;
