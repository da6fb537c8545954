//! StoryForge — PostgreSQL record store.
//!
//! Implements the repository contracts of the projects, versions, and
//! profiles contexts over `sqlx::PgPool`. Affected counts are always the
//! definite `rows_affected` reported by the server.

mod profiles;
mod projects;
mod versions;

pub use profiles::PgProfileRepository;
pub use projects::PgProjectRepository;
pub use versions::PgVersionRepository;

use storyforge_core::error::DomainError;

pub(crate) fn persistence(err: sqlx::Error) -> DomainError {
    DomainError::Persistence(err.to_string())
}
