//! Centralized limits for hierarchy resolution.
//!
//! Hierarchy resolution recurses once per ancestor level, so these limits
//! bound the native stack used while a registry builds a type's data.

/// Maximum nesting depth while resolving ancestors.
///
/// Each level of the hierarchy adds one resolver frame to the stack. Real
/// class libraries rarely exceed a depth of 20; anything past this limit is
/// reported as a malformed hierarchy rather than overflowing the stack.
pub const MAX_HIERARCHY_DEPTH: u32 = 256;

/// Maximum number of ancestor computations entered while the registry holds
/// its build lock.
///
/// The count is reset every time a fresh caller takes the lock, so it bounds
/// the work done on behalf of a single top-level registration.
pub const MAX_HIERARCHY_ITERATIONS: u32 = 100_000;

/// Expected maximum arity of a generic type.
///
/// Mapping lists up to this length stay inline without heap allocation.
pub const INLINE_ARITY: usize = 4;
