//! Memoized ancestor data, one computation per type.
//!
//! ## Locking discipline
//!
//! - **Hits** read a `DashMap` and never block on the build lock.
//! - **Misses** take a single build lock, re-check the cache, and only then
//!   run the [`AncestorResolver`]. A caller that lost the race finds the
//!   winner's `Arc` on the re-check.
//! - **Ancestors** are registered from inside the same critical section by
//!   passing the lock's [`RecursionGuard`] down the resolver. The lock is
//!   never re-acquired, and cached ancestors return on the lock-free path.
//!
//! A type's data is inserted into the cache only after it has been fully
//! computed, so a failed build leaves no entry for the failing type.
//!
//! Providers must not call back into the registry that owns them.

use crate::descriptor::{DescriptorProvider, SlotRef, TypeDescriptor, TypeKey};
use crate::error::{MalformedReason, ResolveError, ResolveResult};
use crate::mapping::GenericParameterMapping;
use crate::query_trace;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::resolver::{AncestorData, AncestorResolver};
use dashmap::DashMap;
use genmap_common::limits::{MAX_HIERARCHY_DEPTH, MAX_HIERARCHY_ITERATIONS};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

/// Limits applied while building ancestor data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Deepest ancestor chain accepted before failing with
    /// [`MalformedReason::DepthExceeded`].
    pub max_depth: u32,
    /// Types a single top-level registration may visit before failing with
    /// [`MalformedReason::IterationLimitExceeded`].
    pub max_iterations: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_HIERARCHY_DEPTH,
            max_iterations: MAX_HIERARCHY_ITERATIONS,
        }
    }
}

impl RegistryConfig {
    fn profile(self) -> RecursionProfile {
        if self == Self::default() {
            return RecursionProfile::HierarchyResolution;
        }
        RecursionProfile::Custom {
            max_depth: self.max_depth,
            max_iterations: self.max_iterations,
        }
    }
}

/// Process-wide (or test-local) store of [`AncestorData`].
///
/// ## Usage
///
/// ```ignore
/// let registry = TypeRegistry::new(Arc::new(graph));
/// let mapping = registry.mapping_for(derived, base, 0)?;
/// ```
pub struct TypeRegistry {
    provider: Arc<dyn DescriptorProvider>,
    cache: DashMap<TypeKey, Arc<AncestorData>, FxBuildHasher>,
    build: Mutex<RecursionGuard<TypeKey>>,
    computed: AtomicU64,
}

impl TypeRegistry {
    pub fn new(provider: Arc<dyn DescriptorProvider>) -> Self {
        Self::with_config(provider, RegistryConfig::default())
    }

    pub fn with_config(provider: Arc<dyn DescriptorProvider>, config: RegistryConfig) -> Self {
        Self {
            provider,
            cache: DashMap::with_hasher(FxBuildHasher),
            build: Mutex::new(RecursionGuard::with_profile(config.profile())),
            computed: AtomicU64::new(0),
        }
    }

    /// The descriptor source this registry was built over.
    pub fn provider(&self) -> &dyn DescriptorProvider {
        self.provider.as_ref()
    }

    pub fn descriptor(&self, ty: TypeKey) -> ResolveResult<Arc<TypeDescriptor>> {
        self.provider
            .descriptor(ty)
            .ok_or(ResolveError::UnknownType(ty))
    }

    /// Cached data for `ty`, without computing it.
    #[inline]
    pub fn get(&self, ty: TypeKey) -> Option<Arc<AncestorData>> {
        self.cache.get(&ty).map(|entry| Arc::clone(entry.value()))
    }

    /// Return the ancestor data of `ty`, computing and caching it on first use.
    pub fn register(&self, ty: TypeKey) -> ResolveResult<Arc<AncestorData>> {
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::register_start(query_id, ty);
        }

        if let Some(data) = self.get(ty) {
            trace!(type_key = %ty, "TypeRegistry::register - cache hit");
            if let Some(query_id) = query_id {
                query_trace::register_end(query_id, ty, true, true);
            }
            return Ok(data);
        }

        let result = {
            let mut guard = self.lock_build();
            let result = self.register_locked(&mut guard, ty);
            guard.reset();
            result
        };

        if let Err(err) = &result {
            debug!(type_key = %ty, error = %err, "TypeRegistry::register - failed");
        }
        if let Some(query_id) = query_id {
            query_trace::register_end(query_id, ty, result.is_ok(), false);
        }
        result
    }

    fn lock_build(&self) -> MutexGuard<'_, RecursionGuard<TypeKey>> {
        match self.build.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("TypeRegistry build lock poisoned; resetting recursion state");
                let mut guard = poisoned.into_inner();
                guard.reset();
                self.build.clear_poison();
                guard
            }
        }
    }

    /// Registration with the build lock already held.
    pub(crate) fn register_locked(
        &self,
        guard: &mut RecursionGuard<TypeKey>,
        ty: TypeKey,
    ) -> ResolveResult<Arc<AncestorData>> {
        if let Some(data) = self.get(ty) {
            return Ok(data);
        }

        let descriptor = self.descriptor(ty)?;
        match guard.enter(ty) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                return Err(ResolveError::MalformedHierarchy {
                    ty,
                    reason: MalformedReason::Cycle,
                });
            }
            RecursionResult::DepthExceeded => {
                return Err(ResolveError::MalformedHierarchy {
                    ty,
                    reason: MalformedReason::DepthExceeded {
                        limit: guard.max_depth(),
                    },
                });
            }
            RecursionResult::IterationExceeded => {
                return Err(ResolveError::MalformedHierarchy {
                    ty,
                    reason: MalformedReason::IterationLimitExceeded {
                        limit: guard.max_iterations(),
                    },
                });
            }
        }

        let result = AncestorResolver::new(self, guard, descriptor).resolve();
        guard.leave(ty);

        let data = Arc::new(result?);
        self.cache.insert(ty, Arc::clone(&data));
        self.computed.fetch_add(1, Ordering::Relaxed);
        debug!(
            type_key = %ty,
            ancestors = data.mappings().len(),
            "TypeRegistry::register - computed"
        );
        Ok(data)
    }

    // -------------------------------------------------------------------------
    // Query surface
    // -------------------------------------------------------------------------

    /// Supertypes of `ty`, nearest first.
    pub fn supertype_chain(&self, ty: TypeKey) -> ResolveResult<Vec<TypeKey>> {
        Ok(self.register(ty)?.supertypes().to_vec())
    }

    /// Interfaces of `ty`, transitively, in first-seen order.
    pub fn interface_set(&self, ty: TypeKey) -> ResolveResult<Vec<TypeKey>> {
        Ok(self.register(ty)?.interfaces().iter().copied().collect())
    }

    /// How parameter `index` of `ancestor` resolves from `ty`.
    pub fn mapping_for(
        &self,
        ty: TypeKey,
        ancestor: TypeKey,
        index: usize,
    ) -> ResolveResult<GenericParameterMapping> {
        self.register(ty)?.mapping(ancestor, index)
    }

    /// Position of `slot` among `ty`'s formal parameters.
    pub fn slot_index_of(&self, ty: TypeKey, slot: SlotRef) -> ResolveResult<usize> {
        self.register(ty)?.slot_index_of(slot)
    }

    /// `true` when `ancestor` is `ty` itself or any of its ancestors.
    pub fn is_same_or_descendant(&self, ty: TypeKey, ancestor: TypeKey) -> ResolveResult<bool> {
        Ok(self.register(ty)?.is_same_or_descendant_of(ancestor))
    }

    /// Number of ancestor records actually computed (cache misses that
    /// succeeded).
    pub fn computed_count(&self) -> u64 {
        self.computed.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
