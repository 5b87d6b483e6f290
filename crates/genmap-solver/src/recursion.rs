//! Recursion guard for ancestor registration.
//!
//! Registration recurses from a type into its supertype and interfaces. The
//! host promises an acyclic graph; this guard keeps the promise checkable:
//!
//! 1. **Cycle detection** via a visiting set (`FxHashSet<K>`), the
//!    in-progress marker of every type currently being built
//! 2. **Depth limiting** to prevent stack overflow
//! 3. **Iteration bounding** to cap the work of a single build
//!
//! The registry keeps one guard behind its build lock, so every key in the
//! visiting set belongs to the build currently holding that lock.

use genmap_common::limits::{MAX_HIERARCHY_DEPTH, MAX_HIERARCHY_ITERATIONS};
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Ancestor registration.
    ///
    /// depth = `MAX_HIERARCHY_DEPTH`, iterations = `MAX_HIERARCHY_ITERATIONS`
    HierarchyResolution,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::HierarchyResolution => MAX_HIERARCHY_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::HierarchyResolution => MAX_HIERARCHY_ITERATIONS,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed with the computation.
    Entered,
    /// This key is already being visited.
    Cycle,
    /// Maximum recursion depth exceeded.
    DepthExceeded,
    /// Maximum iteration count exceeded.
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }
}

/// Tracks recursion state for cycle detection, depth limiting,
/// and iteration bounding.
///
/// # Usage
///
/// ```ignore
/// match guard.enter(key) {
///     RecursionResult::Entered => {
///         let result = build(key);
///         guard.leave(key);
///         result
///     }
///     RecursionResult::Cycle => Err(cycle_error()),
///     RecursionResult::DepthExceeded => Err(depth_error()),
///     RecursionResult::IterationExceeded => Err(iteration_error()),
/// }
/// ```
#[derive(Debug)]
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    /// Create a guard with explicit limits.
    ///
    /// Prefer [`with_profile`](Self::with_profile) for standard use cases.
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller **must** call
    /// [`leave`](Self::leave) with the same key when done, on success and on
    /// failure alike.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            return RecursionResult::IterationExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }
        if self.depth >= self.max_depth {
            return RecursionResult::DepthExceeded;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave a recursive computation for `key`.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);

        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set"
        );

        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    /// Current recursion depth (number of active entries on the stack).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Reset all state while preserving configured limits.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_leave_tracks_depth() {
        let mut guard: RecursionGuard<u32> = RecursionGuard::new(4, 100);
        assert!(guard.enter(1).is_entered());
        assert!(guard.enter(2).is_entered());
        assert_eq!(guard.depth(), 2);
        assert!(guard.is_visiting(&1));
        guard.leave(2);
        guard.leave(1);
        assert!(!guard.is_active());
    }

    #[test]
    fn test_reentering_visiting_key_is_cycle() {
        let mut guard: RecursionGuard<u32> =
            RecursionGuard::with_profile(RecursionProfile::HierarchyResolution);
        assert!(guard.enter(1).is_entered());
        assert!(guard.enter(1).is_cycle());
        guard.leave(1);
    }

    #[test]
    fn test_depth_and_iteration_limits() {
        let mut guard: RecursionGuard<u32> = RecursionGuard::with_profile(RecursionProfile::Custom {
            max_depth: 2,
            max_iterations: 3,
        });
        assert!(guard.enter(1).is_entered());
        assert!(guard.enter(2).is_entered());
        assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
        assert_eq!(guard.enter(4), RecursionResult::IterationExceeded);
        guard.reset();
        assert!(guard.enter(3).is_entered());
        guard.leave(3);
    }
}
