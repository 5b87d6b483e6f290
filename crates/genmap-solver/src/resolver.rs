//! Ancestor resolution and generic substitution.
//!
//! For a type `T`, the resolver produces an [`AncestorData`] record: the
//! supertype chain, the interface set, and a mapping table saying how every
//! ancestor's formal parameters resolve in terms of `T`'s own parameters.
//!
//! ## Substitution
//!
//! For a reference `T -> I<args>`, each argument is first turned into a
//! *direct mapping* relative to `T` (`DerivedIndex(j)` for `T`'s slot `j`,
//! `Concrete(ty)` otherwise). Every entry of `I`'s own table is then pushed
//! through the direct mapping: concrete entries are copied, derived indices
//! are replaced by the direct mapping at that index. `I`'s table contains
//! `I` itself as the identity entry, so the direct mapping lands in `T`'s
//! table through the same loop.
//!
//! ## Erasure decay
//!
//! A raw reference to a generic ancestor drops all generic information: every
//! entry inherited through it becomes the first declared bound of the
//! corresponding slot, whatever the ancestor's table said before.
//!
//! Ancestors are always registered before the type that references them, so
//! their tables are complete when they are read here.

use crate::descriptor::{FormalSlot, SlotRef, TypeArg, TypeDescriptor, TypeKey, TypeReference};
use crate::error::{MalformedReason, ResolveError, ResolveResult};
use crate::mapping::{GenericParameterMapping, MappingList, identity_mapping};
use crate::recursion::RecursionGuard;
use crate::registry::TypeRegistry;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tracing::{debug, trace};

/// Ancestor -> mappings of that ancestor's slots, in insertion order.
pub type AncestorTable = IndexMap<TypeKey, MappingList, FxBuildHasher>;

/// Published ancestor record of one type. Immutable once built.
#[derive(Clone, Debug)]
pub struct AncestorData {
    key: TypeKey,
    arity: usize,
    /// Nearest first.
    supertypes: Vec<TypeKey>,
    /// First-seen order.
    interfaces: IndexSet<TypeKey, FxBuildHasher>,
    mappings: AncestorTable,
}

impl AncestorData {
    fn seed(key: TypeKey, arity: usize) -> Self {
        let mut mappings = AncestorTable::default();
        mappings.insert(key, identity_mapping(arity));
        Self {
            key,
            arity,
            supertypes: Vec::new(),
            interfaces: IndexSet::default(),
            mappings,
        }
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn supertypes(&self) -> &[TypeKey] {
        &self.supertypes
    }

    pub fn interfaces(&self) -> &IndexSet<TypeKey, FxBuildHasher> {
        &self.interfaces
    }

    pub fn mappings(&self) -> &AncestorTable {
        &self.mappings
    }

    /// Every ancestor in search order: supertype chain, then interfaces.
    pub fn ancestors(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.supertypes
            .iter()
            .chain(self.interfaces.iter())
            .copied()
    }

    /// The mapping list for `ancestor`, if it is in this type's table.
    pub fn mappings_for(&self, ancestor: TypeKey) -> Option<&[GenericParameterMapping]> {
        self.mappings.get(&ancestor).map(|m| m.as_slice())
    }

    /// How `ancestor`'s parameter `index` resolves from this type.
    pub fn mapping(&self, ancestor: TypeKey, index: usize) -> ResolveResult<GenericParameterMapping> {
        let mappings = self
            .mappings
            .get(&ancestor)
            .ok_or(ResolveError::UnknownAncestor {
                ty: self.key,
                ancestor,
            })?;
        mappings
            .get(index)
            .copied()
            .ok_or(ResolveError::IndexOutOfRange {
                ancestor,
                index,
                arity: mappings.len(),
            })
    }

    /// Position of `slot` among this type's formal parameters.
    pub fn slot_index_of(&self, slot: SlotRef) -> ResolveResult<usize> {
        let index = slot.index as usize;
        if slot.owner == self.key && index < self.arity {
            Ok(index)
        } else {
            Err(ResolveError::UnknownSlot { ty: self.key, slot })
        }
    }

    /// `true` when `ancestor` is this type or one of its ancestors.
    #[inline]
    pub fn is_same_or_descendant_of(&self, ancestor: TypeKey) -> bool {
        self.mappings.contains_key(&ancestor)
    }
}

/// Builds the [`AncestorData`] of a single type.
///
/// Runs while the registry's build lock is held; `guard` is the lock's
/// recursion state, threaded through so ancestors register without taking
/// the lock again.
pub(crate) struct AncestorResolver<'a> {
    registry: &'a TypeRegistry,
    guard: &'a mut RecursionGuard<TypeKey>,
    descriptor: Arc<TypeDescriptor>,
}

impl<'a> AncestorResolver<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        guard: &'a mut RecursionGuard<TypeKey>,
        descriptor: Arc<TypeDescriptor>,
    ) -> Self {
        Self {
            registry,
            guard,
            descriptor,
        }
    }

    #[inline]
    fn key(&self) -> TypeKey {
        self.descriptor.key
    }

    pub(crate) fn resolve(mut self) -> ResolveResult<AncestorData> {
        let descriptor = Arc::clone(&self.descriptor);
        let mut data = AncestorData::seed(descriptor.key, descriptor.arity());

        for reference in &descriptor.interfaces {
            let inherited = self.ancestor(reference.target)?;
            self.inherit(reference, &inherited, &mut data.mappings)?;
            data.interfaces.insert(reference.target);
            data.interfaces
                .extend(inherited.interfaces.iter().copied());
        }

        if let Some(reference) = &descriptor.supertype {
            let inherited = self.ancestor(reference.target)?;
            self.inherit(reference, &inherited, &mut data.mappings)?;
            data.supertypes.push(reference.target);
            data.supertypes
                .extend(inherited.supertypes.iter().copied());
            data.interfaces
                .extend(inherited.interfaces.iter().copied());
        }

        debug!(
            type_key = %data.key,
            supertypes = data.supertypes.len(),
            interfaces = data.interfaces.len(),
            ancestors = data.mappings.len(),
            "AncestorResolver::resolve"
        );
        Ok(data)
    }

    fn ancestor(&mut self, key: TypeKey) -> ResolveResult<Arc<AncestorData>> {
        self.registry.register_locked(self.guard, key)
    }

    /// Merge everything `reference` brings in from `inherited` into `table`.
    fn inherit(
        &self,
        reference: &TypeReference,
        inherited: &AncestorData,
        table: &mut AncestorTable,
    ) -> ResolveResult<()> {
        if reference.is_raw() && inherited.arity > 0 {
            return self.decay(inherited, table);
        }
        if reference.args.len() != inherited.arity {
            return Err(ResolveError::MalformedHierarchy {
                ty: self.key(),
                reason: MalformedReason::ArityMismatch {
                    target: reference.target,
                    expected: inherited.arity,
                    found: reference.args.len(),
                },
            });
        }

        let direct = reference
            .args
            .iter()
            .map(|&arg| self.direct_mapping(arg))
            .collect::<ResolveResult<MappingList>>()?;

        for (&ancestor, mappings) in &inherited.mappings {
            let substituted = mappings
                .iter()
                .enumerate()
                .map(|(index, mapping)| {
                    mapping
                        .substitute(&direct)
                        .ok_or(ResolveError::IndexOutOfRange {
                            ancestor,
                            index,
                            arity: direct.len(),
                        })
                })
                .collect::<ResolveResult<MappingList>>()?;
            trace!(
                type_key = %self.key(),
                ancestor = %ancestor,
                via = %reference.target,
                "AncestorResolver::inherit"
            );
            table.insert(ancestor, substituted);
        }
        Ok(())
    }

    /// Express one actual argument relative to the type being built.
    fn direct_mapping(&self, arg: TypeArg) -> ResolveResult<GenericParameterMapping> {
        match arg {
            TypeArg::Concrete(ty) => Ok(GenericParameterMapping::Concrete(ty)),
            TypeArg::Slot(slot)
                if slot.owner == self.key() && (slot.index as usize) < self.descriptor.arity() =>
            {
                Ok(GenericParameterMapping::DerivedIndex(slot.index as usize))
            }
            TypeArg::Slot(slot) => Err(ResolveError::UnknownSlot {
                ty: self.key(),
                slot,
            }),
        }
    }

    /// Replace every entry inherited through a raw reference by the first
    /// declared bound of the ancestor slot it describes.
    fn decay(&self, inherited: &AncestorData, table: &mut AncestorTable) -> ResolveResult<()> {
        let provider = self.registry.provider();
        for (&ancestor, mappings) in &inherited.mappings {
            let descriptor = provider
                .descriptor(ancestor)
                .ok_or(ResolveError::UnknownType(ancestor))?;
            let erased = (0..mappings.len())
                .map(|index| {
                    let bound = descriptor
                        .slots
                        .get(index)
                        .and_then(FormalSlot::first_bound)
                        .unwrap_or_else(|| provider.default_bound());
                    GenericParameterMapping::Concrete(bound)
                })
                .collect();
            table.insert(ancestor, erased);
        }
        debug!(
            type_key = %self.key(),
            raw = %inherited.key,
            erased = inherited.mappings.len(),
            "AncestorResolver::decay"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
