//! Domain model (ids, task specs, chains, outcomes, events, errors).

pub mod chain;
pub mod constraints;
pub mod errors;
pub mod events;
pub mod ids;
pub mod outcome;
pub mod task;

pub use chain::{ChainDefinition, Step};
pub use constraints::{Constraints, NetworkType};
pub use errors::{Result, WeftError};
pub use events::CompletionEvent;
pub use ids::ChainId;
pub use outcome::{ChainOutcome, FailureKind, TaskOutcome};
pub use task::{TaskKind, TaskSpec};
