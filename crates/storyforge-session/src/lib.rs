//! StoryForge — Session context.
//!
//! Owns all session/project/UI state in one explicitly passed state struct
//! and wires the other contexts together: tier gates before AI calls,
//! optimistic persistence with rollback, version snapshots on every accepted
//! mutation, and a hard reset on logout.

pub mod application;
pub mod domain;

pub use application::controller::SessionController;
pub use domain::state::{
    DraftScope, FullStorySuggestion, Notice, NoticeLevel, PendingProject, SessionState,
};
