//! Host-supplied type descriptors.
//!
//! The solver never inspects a live type system. A host describes each
//! nominal type through a [`TypeDescriptor`] and hands the solver a
//! [`DescriptorProvider`] that looks descriptors up by [`TypeKey`].
//!
//! ## Shape of a descriptor
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `slots` | formal type parameters, in declaration order |
//! | `supertype` | optional direct supertype reference |
//! | `interfaces` | direct interface references, in declaration order |
//! | `members` | method signatures declared directly on the type |
//! | `fields` | fields declared directly on the type |

use genmap_common::interner::Atom;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// TypeKey
// =============================================================================

/// Identity key of a nominal type.
///
/// Keys are allocated by the host. Two references denote the same type iff
/// their keys are equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeKey(pub u32);

impl TypeKey {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Slots and arguments
// =============================================================================

/// Positional identity of a formal type parameter slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SlotRef {
    /// The type declaring the slot.
    pub owner: TypeKey,
    /// Position of the slot in the owner's parameter list.
    pub index: u32,
}

impl SlotRef {
    pub const fn new(owner: TypeKey, index: u32) -> Self {
        Self { owner, index }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.owner, self.index)
    }
}

/// An actual type argument, or the type of a member parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeArg {
    /// A formal slot of the referencing (or declaring) type.
    Slot(SlotRef),
    /// A concrete type.
    Concrete(TypeKey),
}

impl TypeArg {
    pub const fn slot(owner: TypeKey, index: u32) -> Self {
        Self::Slot(SlotRef::new(owner, index))
    }

    pub const fn as_slot(self) -> Option<SlotRef> {
        match self {
            Self::Slot(slot) => Some(slot),
            Self::Concrete(_) => None,
        }
    }
}

impl From<TypeKey> for TypeArg {
    fn from(key: TypeKey) -> Self {
        Self::Concrete(key)
    }
}

impl From<SlotRef> for TypeArg {
    fn from(slot: SlotRef) -> Self {
        Self::Slot(slot)
    }
}

/// A reference from one type to a supertype or interface.
///
/// A raw reference carries no arguments, even when the target is generic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeReference {
    pub target: TypeKey,
    pub args: SmallVec<[TypeArg; 4]>,
}

impl TypeReference {
    /// A parameterized reference `target<args...>`.
    pub fn new(target: TypeKey, args: impl IntoIterator<Item = TypeArg>) -> Self {
        Self {
            target,
            args: args.into_iter().collect(),
        }
    }

    /// A raw reference to `target`.
    pub fn raw(target: TypeKey) -> Self {
        Self {
            target,
            args: SmallVec::new(),
        }
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        self.args.is_empty()
    }
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Class,
    Interface,
}

/// A formal type parameter and its declared upper bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormalSlot {
    pub name: Atom,
    /// Declared bounds in source order. Empty means the root type.
    pub bounds: SmallVec<[TypeKey; 1]>,
}

impl FormalSlot {
    pub fn new(name: Atom) -> Self {
        Self {
            name,
            bounds: SmallVec::new(),
        }
    }

    pub fn with_bounds(mut self, bounds: impl IntoIterator<Item = TypeKey>) -> Self {
        self.bounds = bounds.into_iter().collect();
        self
    }

    /// The bound a raw reference erases this slot to.
    #[inline]
    pub fn first_bound(&self) -> Option<TypeKey> {
        self.bounds.first().copied()
    }
}

/// A method signature declared directly on a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberSignature {
    pub declaring_type: TypeKey,
    pub name: Atom,
    pub params: SmallVec<[TypeArg; 4]>,
}

impl MemberSignature {
    pub fn new(
        declaring_type: TypeKey,
        name: Atom,
        params: impl IntoIterator<Item = TypeArg>,
    ) -> Self {
        Self {
            declaring_type,
            name,
            params: params.into_iter().collect(),
        }
    }

    #[inline]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// A field declared directly on a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub declaring_type: TypeKey,
    pub name: Atom,
    pub ty: TypeArg,
}

/// Complete host description of one nominal type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub name: Atom,
    pub kind: TypeKind,
    pub slots: Vec<FormalSlot>,
    pub supertype: Option<TypeReference>,
    pub interfaces: Vec<TypeReference>,
    pub members: Vec<MemberSignature>,
    pub fields: Vec<FieldDecl>,
}

impl TypeDescriptor {
    pub fn new(key: TypeKey, name: Atom, kind: TypeKind) -> Self {
        Self {
            key,
            name,
            kind,
            slots: Vec::new(),
            supertype: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Iterate the own-declared members with the given name.
    pub fn members_named(&self, name: Atom) -> impl Iterator<Item = &MemberSignature> + '_ {
        self.members.iter().filter(move |m| m.name == name)
    }
}

// =============================================================================
// Provider seam
// =============================================================================

/// Source of type descriptors for a [`TypeRegistry`](crate::TypeRegistry).
///
/// Implementations must be stable: once a descriptor has been handed out for
/// a key, later calls must describe the same type.
pub trait DescriptorProvider: Send + Sync {
    /// Look up the descriptor for `key`.
    fn descriptor(&self, key: TypeKey) -> Option<Arc<TypeDescriptor>>;

    /// The bound used for slots that declare none (the root object type).
    fn default_bound(&self) -> TypeKey;
}
