//! StoryForge — Project context.
//!
//! A project is a user's in-progress story instance bound to one framework.
//! This crate defines the project record, the repository contract against the
//! remote store, and the client-side cache with its
//! optimistic-update-with-rollback discipline.

mod cache;
mod project;
mod repository;

pub use cache::{ProjectCache, optimistic_update};
pub use project::{Project, ProjectDraft, ProjectPatch};
pub use repository::ProjectRepository;
