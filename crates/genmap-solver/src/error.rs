//! Typed failures of registry and override queries.
//!
//! None of these are transient: they signal malformed host input or a query
//! that does not make sense for the given types. Callers get them back
//! synchronously and nothing is retried.

use crate::descriptor::{SlotRef, TypeKey};

/// Why a hierarchy was rejected while building a type's ancestor data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    /// A parameterized reference supplied the wrong number of arguments.
    #[error("reference to {target} supplies {found} type arguments, expected {expected}")]
    ArityMismatch {
        target: TypeKey,
        expected: usize,
        found: usize,
    },
    /// The type is its own ancestor.
    #[error("type is its own ancestor")]
    Cycle,
    /// The hierarchy nests deeper than the configured limit.
    #[error("hierarchy is deeper than {limit} levels")]
    DepthExceeded { limit: u32 },
    /// A single registration visited more types than the configured limit.
    #[error("registration visited more than {limit} types")]
    IterationLimitExceeded { limit: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{ancestor} is not an ancestor of {ty}")]
    UnknownAncestor { ty: TypeKey, ancestor: TypeKey },

    #[error("parameter index {index} is out of range for {ancestor} (arity {arity})")]
    IndexOutOfRange {
        ancestor: TypeKey,
        index: usize,
        arity: usize,
    },

    #[error("slot {slot} does not belong to {ty}")]
    UnknownSlot { ty: TypeKey, slot: SlotRef },

    #[error("malformed hierarchy at {ty}: {reason}")]
    MalformedHierarchy { ty: TypeKey, reason: MalformedReason },

    #[error("no descriptor for {0}")]
    UnknownType(TypeKey),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
