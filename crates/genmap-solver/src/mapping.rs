//! Generic parameter mappings.
//!
//! A mapping says how one formal parameter of an ancestor resolves from the
//! point of view of a descendant: either to one of the descendant's own
//! formal parameters, or to a fixed concrete type.

use crate::descriptor::TypeKey;
use genmap_common::limits::INLINE_ARITY;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Resolution of one ancestor parameter, relative to the table's owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GenericParameterMapping {
    /// Formal slot `i` of the type owning the mapping table.
    DerivedIndex(usize),
    /// A fixed type. Never substituted again.
    Concrete(TypeKey),
}

/// Mappings for every formal parameter of one ancestor, in slot order.
pub type MappingList = SmallVec<[GenericParameterMapping; INLINE_ARITY]>;

impl GenericParameterMapping {
    #[inline]
    pub const fn is_concrete(self) -> bool {
        matches!(self, Self::Concrete(_))
    }

    /// The fixed type, if this mapping is concrete.
    #[inline]
    pub const fn concrete_type(self) -> Option<TypeKey> {
        match self {
            Self::Concrete(ty) => Some(ty),
            Self::DerivedIndex(_) => None,
        }
    }

    /// The owner's slot index, if this mapping is not concrete.
    #[inline]
    pub const fn derived_index(self) -> Option<usize> {
        match self {
            Self::DerivedIndex(index) => Some(index),
            Self::Concrete(_) => None,
        }
    }

    /// Re-express this mapping through `direct`, the mapping of the
    /// intermediate type's slots in terms of the new owner.
    ///
    /// Returns `None` when a derived index falls outside `direct`.
    #[inline]
    pub fn substitute(self, direct: &[GenericParameterMapping]) -> Option<Self> {
        match self {
            Self::Concrete(_) => Some(self),
            Self::DerivedIndex(index) => direct.get(index).copied(),
        }
    }
}

impl From<TypeKey> for GenericParameterMapping {
    fn from(ty: TypeKey) -> Self {
        Self::Concrete(ty)
    }
}

impl From<usize> for GenericParameterMapping {
    fn from(index: usize) -> Self {
        Self::DerivedIndex(index)
    }
}

impl fmt::Display for GenericParameterMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(ty) => write!(f, "{ty}"),
            Self::DerivedIndex(index) => write!(f, "{index}"),
        }
    }
}

/// The identity table entry of a type with `arity` formal parameters.
pub fn identity_mapping(arity: usize) -> MappingList {
    (0..arity).map(GenericParameterMapping::DerivedIndex).collect()
}
