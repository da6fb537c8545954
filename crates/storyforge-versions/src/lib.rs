//! StoryForge — Version History context.
//!
//! Every accepted project mutation appends an immutable snapshot of the
//! project's content; history is trimmed to the newest `MAX_VERSIONS` after
//! each insert. Trimming is an unbounded-growth guard, not a strict FIFO
//! queue: a failure between insert and trim leaves temporarily more rows,
//! corrected on the next snapshot.

mod repository;
mod store;
mod version;

pub use repository::VersionRepository;
pub use store::{MAX_VERSIONS, VersionStore};
pub use version::{NewVersion, ProjectVersion};
