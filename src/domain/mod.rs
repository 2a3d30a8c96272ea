//! Domain layer: the balanced member tree and its analyses
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod analysis;
pub mod arena;
pub mod division;
pub mod error;
pub mod events;

pub use arena::{FamilyTree, Member, MemberNode, Rotation};
pub use division::DivisionStrategy;
pub use error::{DomainError, DomainResult};
pub use events::{ChangeEvent, ChangeLog, Discard};
