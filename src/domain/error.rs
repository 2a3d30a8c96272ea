//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors report broken tree invariants and invalid domain values.
/// These are independent of parsing and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("order violated at {label} ({score}): score outside of ({lower:?}, {upper:?})")]
    OrderViolation {
        label: String,
        score: f64,
        lower: Option<f64>,
        upper: Option<f64>,
    },

    #[error("stale height at {label}: stored {stored}, actual {actual}")]
    HeightMismatch {
        label: String,
        stored: i32,
        actual: i32,
    },

    #[error("unbalanced at {label}: left height {left}, right height {right}")]
    Unbalanced { label: String, left: i32, right: i32 },

    #[error("dangling child link {0}")]
    DanglingLink(String),

    #[error("unreachable members: {reachable} reachable, {stored} stored")]
    Unreachable { reachable: usize, stored: usize },

    #[error("unknown division strategy: {0}")]
    UnknownStrategy(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
