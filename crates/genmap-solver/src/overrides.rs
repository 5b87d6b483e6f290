//! Generic override resolution.
//!
//! Decides whether a member declared on a descendant overrides a member of
//! an ancestor once the ancestor's type parameters are substituted, and
//! searches a type's ancestors for overridden or required members.
//!
//! Search order everywhere is: own declarations, supertype chain (nearest
//! first), then interfaces in first-seen order.

use crate::descriptor::{FieldDecl, MemberSignature, TypeArg, TypeDescriptor, TypeKey};
use crate::error::ResolveResult;
use crate::mapping::GenericParameterMapping;
use crate::query_trace;
use crate::registry::TypeRegistry;
use tracing::trace;

/// Answers override queries against a [`TypeRegistry`].
pub struct OverrideResolver<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// `true` if `derived` overrides (or implements) `base`.
    ///
    /// Not symmetric: `base`'s formal slots are resolved through the
    /// mapping table of `derived`'s declaring type.
    pub fn overrides(
        &self,
        base: &MemberSignature,
        derived: &MemberSignature,
    ) -> ResolveResult<bool> {
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(query_id) = query_id {
            query_trace::relation_start(
                query_id,
                "overrides",
                base.declaring_type,
                derived.declaring_type,
            );
        }
        let result = self.overrides_inner(base, derived);
        if let Some(query_id) = query_id {
            query_trace::relation_end(
                query_id,
                "overrides",
                result.is_ok(),
                matches!(result, Ok(true)),
            );
        }
        result
    }

    fn overrides_inner(
        &self,
        base: &MemberSignature,
        derived: &MemberSignature,
    ) -> ResolveResult<bool> {
        if base.param_count() != derived.param_count() {
            return Ok(false);
        }
        let derived_data = self.registry.register(derived.declaring_type)?;
        if !derived_data.is_same_or_descendant_of(base.declaring_type) {
            return Ok(false);
        }
        if base.name != derived.name {
            return Ok(false);
        }
        let base_data = self.registry.register(base.declaring_type)?;

        for (index, (&base_param, &derived_param)) in
            base.params.iter().zip(derived.params.iter()).enumerate()
        {
            let matches = match base_param {
                TypeArg::Concrete(_) => base_param == derived_param,
                TypeArg::Slot(slot) => {
                    let position = base_data.slot_index_of(slot)?;
                    let resolved = derived_data.mapping(base.declaring_type, position)?;
                    match derived_param {
                        TypeArg::Concrete(ty) => resolved.concrete_type() == Some(ty),
                        TypeArg::Slot(derived_slot) => {
                            let derived_index = derived_data.slot_index_of(derived_slot)?;
                            resolved == GenericParameterMapping::DerivedIndex(derived_index)
                        }
                    }
                }
            };
            if !matches {
                trace!(
                    base = %base.declaring_type,
                    derived = %derived.declaring_type,
                    param = index,
                    "OverrideResolver::overrides - parameter mismatch"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// All ancestor members `derived` overrides, supertypes first.
    pub fn find_base_members(
        &self,
        derived: &MemberSignature,
    ) -> ResolveResult<Vec<MemberSignature>> {
        let data = self.registry.register(derived.declaring_type)?;
        let mut found = Vec::new();
        for ancestor in data.ancestors() {
            let descriptor = self.registry.descriptor(ancestor)?;
            for candidate in descriptor.members_named(derived.name) {
                if self.overrides(candidate, derived)? {
                    found.push(candidate.clone());
                }
            }
        }
        Ok(found)
    }

    /// First member of `ty` or its ancestors matching `predicate`.
    pub fn find_required_member(
        &self,
        ty: TypeKey,
        predicate: impl Fn(&MemberSignature) -> bool,
    ) -> ResolveResult<Option<MemberSignature>> {
        self.search(ty, |descriptor| {
            descriptor.members.iter().find(|&m| predicate(m)).cloned()
        })
    }

    /// First member declared directly on `ty` matching `predicate`.
    pub fn find_declared_member(
        &self,
        ty: TypeKey,
        predicate: impl Fn(&MemberSignature) -> bool,
    ) -> ResolveResult<Option<MemberSignature>> {
        let descriptor = self.registry.descriptor(ty)?;
        Ok(descriptor.members.iter().find(|&m| predicate(m)).cloned())
    }

    /// First field of `ty` or its ancestors matching `predicate`.
    pub fn find_required_field(
        &self,
        ty: TypeKey,
        predicate: impl Fn(&FieldDecl) -> bool,
    ) -> ResolveResult<Option<FieldDecl>> {
        self.search(ty, |descriptor| {
            descriptor.fields.iter().find(|&f| predicate(f)).cloned()
        })
    }

    /// First field declared directly on `ty` matching `predicate`.
    pub fn find_declared_field(
        &self,
        ty: TypeKey,
        predicate: impl Fn(&FieldDecl) -> bool,
    ) -> ResolveResult<Option<FieldDecl>> {
        let descriptor = self.registry.descriptor(ty)?;
        Ok(descriptor.fields.iter().find(|&f| predicate(f)).cloned())
    }

    /// `ty` itself if it is an interface matching `predicate`, otherwise the
    /// first matching interface it implements.
    pub fn find_required_interface(
        &self,
        ty: TypeKey,
        predicate: impl Fn(&TypeDescriptor) -> bool,
    ) -> ResolveResult<Option<TypeKey>> {
        let descriptor = self.registry.descriptor(ty)?;
        let data = self.registry.register(ty)?;
        if descriptor.is_interface() && predicate(&*descriptor) {
            return Ok(Some(ty));
        }
        for &interface in data.interfaces() {
            if predicate(&*self.registry.descriptor(interface)?) {
                return Ok(Some(interface));
            }
        }
        Ok(None)
    }

    fn search<T>(
        &self,
        ty: TypeKey,
        mut find: impl FnMut(&TypeDescriptor) -> Option<T>,
    ) -> ResolveResult<Option<T>> {
        if let Some(found) = find(&*self.registry.descriptor(ty)?) {
            return Ok(Some(found));
        }
        let data = self.registry.register(ty)?;
        for ancestor in data.ancestors() {
            if let Some(found) = find(&*self.registry.descriptor(ancestor)?) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../tests/override_tests.rs"]
mod tests;
