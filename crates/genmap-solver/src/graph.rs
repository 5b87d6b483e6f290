//! In-memory type graphs.
//!
//! [`TypeGraph`] is a ready-made [`DescriptorProvider`] for hosts that do not
//! have a type system of their own: tests, the hierarchy file loader and the
//! CLI all describe their hierarchies through [`TypeGraphBuilder`].
//!
//! The builder pre-declares the root class `Object`, which is also the bound
//! of every slot that declares none.

use crate::descriptor::{
    DescriptorProvider, FieldDecl, FormalSlot, MemberSignature, SlotRef, TypeArg, TypeDescriptor,
    TypeKey, TypeKind, TypeReference,
};
use crate::mapping::GenericParameterMapping;
use genmap_common::interner::{Atom, Interner};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Name of the pre-declared root class.
pub const ROOT_TYPE_NAME: &str = "Object";

/// Immutable set of type descriptors addressed by [`TypeKey`].
#[derive(Debug)]
pub struct TypeGraph {
    interner: Interner,
    types: Vec<Arc<TypeDescriptor>>,
    by_name: FxHashMap<Atom, TypeKey>,
    object: TypeKey,
}

impl DescriptorProvider for TypeGraph {
    fn descriptor(&self, key: TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.types.get(key.index()).cloned()
    }

    fn default_bound(&self) -> TypeKey {
        self.object
    }
}

impl TypeGraph {
    pub fn builder() -> TypeGraphBuilder {
        TypeGraphBuilder::new()
    }

    /// The root class.
    pub fn object(&self) -> TypeKey {
        self.object
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.types.iter().map(|d| d.key)
    }

    pub fn get(&self, key: TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(key.index()).map(|d| d.as_ref())
    }

    pub fn type_named(&self, name: &str) -> Option<TypeKey> {
        let atom = self.interner.get(name)?;
        self.by_name.get(&atom).copied()
    }

    pub fn name_of(&self, key: TypeKey) -> &str {
        self.get(key)
            .map(|d| self.interner.resolve(d.name))
            .unwrap_or("<unknown>")
    }

    pub fn resolve_atom(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    /// Index of the slot of `owner` named `name`.
    pub fn slot_named(&self, owner: TypeKey, name: &str) -> Option<u32> {
        let atom = self.interner.get(name)?;
        self.get(owner)?
            .slots
            .iter()
            .position(|s| s.name == atom)
            .map(|index| index as u32)
    }

    /// The member of `ty` named `name` whose parameter list is exactly `params`.
    pub fn member(&self, ty: TypeKey, name: &str, params: &[TypeArg]) -> Option<&MemberSignature> {
        let atom = self.interner.get(name)?;
        self.get(ty)?
            .members_named(atom)
            .find(|m| m.params.as_slice() == params)
    }

    /// The first member of `ty` named `name`.
    pub fn member_named(&self, ty: TypeKey, name: &str) -> Option<&MemberSignature> {
        let atom = self.interner.get(name)?;
        self.get(ty)?.members_named(atom).next()
    }

    /// Render a type argument as source text: a slot name or a type name.
    pub fn display_arg(&self, arg: TypeArg) -> String {
        match arg {
            TypeArg::Concrete(ty) => self.name_of(ty).to_string(),
            TypeArg::Slot(slot) => self.slot_name(slot),
        }
    }

    /// Render a mapping entry of `owner`'s table as source text.
    pub fn display_mapping(&self, owner: TypeKey, mapping: GenericParameterMapping) -> String {
        match mapping {
            GenericParameterMapping::Concrete(ty) => self.name_of(ty).to_string(),
            GenericParameterMapping::DerivedIndex(index) => {
                self.slot_name(SlotRef::new(owner, index as u32))
            }
        }
    }

    /// Render a member as `Type.name(P1, P2)`.
    pub fn display_member(&self, member: &MemberSignature) -> String {
        let params: Vec<String> = member.params.iter().map(|&p| self.display_arg(p)).collect();
        format!(
            "{}.{}({})",
            self.name_of(member.declaring_type),
            self.interner.resolve(member.name),
            params.join(", ")
        )
    }

    fn slot_name(&self, slot: SlotRef) -> String {
        self.get(slot.owner)
            .and_then(|d| d.slots.get(slot.index as usize))
            .map(|s| self.interner.resolve(s.name).to_string())
            .unwrap_or_else(|| slot.to_string())
    }
}

/// Mutable construction side of a [`TypeGraph`].
///
/// Methods taking a `TypeKey` expect a key returned by this builder.
#[derive(Debug)]
pub struct TypeGraphBuilder {
    interner: Interner,
    types: Vec<TypeDescriptor>,
    by_name: FxHashMap<Atom, TypeKey>,
    object: TypeKey,
}

impl Default for TypeGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraphBuilder {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        let mut builder = Self {
            interner,
            types: Vec::new(),
            by_name: FxHashMap::default(),
            object: TypeKey(0),
        };
        builder.object = builder.declare(ROOT_TYPE_NAME, TypeKind::Class, &[]);
        builder
    }

    pub fn object(&self) -> TypeKey {
        self.object
    }

    pub fn intern(&mut self, name: &str) -> Atom {
        self.interner.intern(name)
    }

    pub fn type_named(&self, name: &str) -> Option<TypeKey> {
        let atom = self.interner.get(name)?;
        self.by_name.get(&atom).copied()
    }

    /// Declare a new type with formal slots named `slots`.
    ///
    /// A later declaration with the same name shadows the earlier one in
    /// name lookups; both keep their keys.
    pub fn declare(&mut self, name: &str, kind: TypeKind, slots: &[&str]) -> TypeKey {
        let key = TypeKey(self.types.len() as u32);
        let name = self.interner.intern(name);
        let mut descriptor = TypeDescriptor::new(key, name, kind);
        descriptor.slots = slots
            .iter()
            .map(|slot| FormalSlot::new(self.interner.intern(slot)))
            .collect();
        self.types.push(descriptor);
        self.by_name.insert(name, key);
        key
    }

    pub fn class(&mut self, name: &str, slots: &[&str]) -> TypeKey {
        self.declare(name, TypeKind::Class, slots)
    }

    pub fn interface(&mut self, name: &str, slots: &[&str]) -> TypeKey {
        self.declare(name, TypeKind::Interface, slots)
    }

    /// Slot `index` of `owner` as a type argument.
    pub fn slot(&self, owner: TypeKey, index: u32) -> TypeArg {
        TypeArg::slot(owner, index)
    }

    /// Index of the slot of `owner` named `name`.
    pub fn slot_named(&self, owner: TypeKey, name: &str) -> Option<u32> {
        let atom = self.interner.get(name)?;
        self.types
            .get(owner.index())?
            .slots
            .iter()
            .position(|s| s.name == atom)
            .map(|index| index as u32)
    }

    pub fn bound(
        &mut self,
        owner: TypeKey,
        index: u32,
        bounds: impl IntoIterator<Item = TypeKey>,
    ) -> &mut Self {
        let slot = &mut self.descriptor_mut(owner).slots[index as usize];
        slot.bounds = bounds.into_iter().collect();
        self
    }

    pub fn extends(
        &mut self,
        ty: TypeKey,
        target: TypeKey,
        args: impl IntoIterator<Item = TypeArg>,
    ) -> &mut Self {
        self.descriptor_mut(ty).supertype = Some(TypeReference::new(target, args));
        self
    }

    pub fn extends_raw(&mut self, ty: TypeKey, target: TypeKey) -> &mut Self {
        self.descriptor_mut(ty).supertype = Some(TypeReference::raw(target));
        self
    }

    pub fn implements(
        &mut self,
        ty: TypeKey,
        target: TypeKey,
        args: impl IntoIterator<Item = TypeArg>,
    ) -> &mut Self {
        self.descriptor_mut(ty)
            .interfaces
            .push(TypeReference::new(target, args));
        self
    }

    pub fn implements_raw(&mut self, ty: TypeKey, target: TypeKey) -> &mut Self {
        self.descriptor_mut(ty)
            .interfaces
            .push(TypeReference::raw(target));
        self
    }

    /// Declare a method on `ty` and return its signature.
    pub fn method(
        &mut self,
        ty: TypeKey,
        name: &str,
        params: impl IntoIterator<Item = TypeArg>,
    ) -> MemberSignature {
        let member = MemberSignature::new(ty, self.interner.intern(name), params);
        self.descriptor_mut(ty).members.push(member.clone());
        member
    }

    /// Declare a field on `ty` and return it.
    pub fn field(&mut self, ty: TypeKey, name: &str, field_type: TypeArg) -> FieldDecl {
        let field = FieldDecl {
            declaring_type: ty,
            name: self.interner.intern(name),
            ty: field_type,
        };
        self.descriptor_mut(ty).fields.push(field.clone());
        field
    }

    pub fn build(self) -> TypeGraph {
        TypeGraph {
            interner: self.interner,
            types: self.types.into_iter().map(Arc::new).collect(),
            by_name: self.by_name,
            object: self.object,
        }
    }

    fn descriptor_mut(&mut self, ty: TypeKey) -> &mut TypeDescriptor {
        &mut self.types[ty.index()]
    }
}
