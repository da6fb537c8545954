//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Quota and tier denials are deliberately absent: they are gates routed to
/// an upgrade prompt, not failures, and are modeled as values in the usage
/// context.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A targeted record no longer exists in the store of record.
    #[error("record not found: {0}")]
    NotFound(Uuid),

    /// The remote store rejected or failed a read/write.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The text-generation provider failed in transport or returned an
    /// unparseable response.
    #[error("text provider error: {0}")]
    Provider(String),

    /// A validation error in domain logic or request input.
    #[error("validation error: {0}")]
    Validation(String),
}
