//! Reference data and one-round battle resolution.
//!
//! - [`core`] holds the immutable reference data: elements, the type chart,
//!   combatants and moves.
//! - [`engine`] resolves a single deterministic round between two combatants.
//! - [`catalog`] is the read-only store interface the rest of the workspace reads
//!   combatants and movesets through, plus a JSON-backed implementation.

pub use self::{core::*, engine::*};

pub mod catalog;
pub mod core;
pub mod engine;

/// Coarse classification shared by every error type in the workspace.
///
/// Callers at a boundary (CLI, service) map errors to a stable category without
/// matching on every concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum ErrorKind {
    /// Reference data is inconsistent (unknown element, missing required field).
    #[display("data integrity")]
    DataIntegrity,
    /// A transform cannot be aligned with the frozen feature schema.
    #[display("schema mismatch")]
    SchemaMismatch,
    /// The model bundle is not loaded yet; retrying later may succeed.
    #[display("service unavailable")]
    ServiceUnavailable,
    /// The caller supplied malformed input.
    #[display("invalid argument")]
    InvalidArgument,
    /// A referenced entity does not exist.
    #[display("not found")]
    NotFound,
}
