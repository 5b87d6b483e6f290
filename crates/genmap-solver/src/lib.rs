//! Generic Parameter Mapping Solver
//!
//! For every nominal type in a generic hierarchy, this crate computes how each
//! ancestor's formal type parameters resolve: to one of the type's own formal
//! parameters, or to a concrete type. On top of that mapping it decides
//! generic override compatibility between member signatures.
//!
//! - **`TypeRegistry`**: memoized, thread-safe ancestor data (one computation
//!   per type, lock-free hits via `DashMap`)
//! - **`AncestorResolver`**: transitive substitution with erasure decay for
//!   raw references
//! - **`OverrideResolver`**: override checks and ancestor member search
//! - **`DescriptorProvider`**: the host seam; `TypeGraph` is an in-memory
//!   implementation
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod overrides;
mod query_trace;
pub mod recursion;
pub mod registry;
pub mod resolver;

pub use descriptor::{
    DescriptorProvider, FieldDecl, FormalSlot, MemberSignature, SlotRef, TypeArg, TypeDescriptor,
    TypeKey, TypeKind, TypeReference,
};
pub use error::{MalformedReason, ResolveError, ResolveResult};
pub use graph::{ROOT_TYPE_NAME, TypeGraph, TypeGraphBuilder};
pub use mapping::{GenericParameterMapping, MappingList, identity_mapping};
pub use overrides::OverrideResolver;
pub use registry::{RegistryConfig, TypeRegistry};
pub use resolver::{AncestorData, AncestorTable};

// Test modules: most are loaded by their source files via #[path = "tests/..."] declarations.
#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
#[cfg(test)]
#[path = "../tests/scenario_tests.rs"]
mod scenario_tests;
#[cfg(test)]
#[path = "../tests/concurrent_tests.rs"]
mod concurrent_tests;
// mapping tests: inline in mapping.rs
// recursion tests: inline in recursion.rs
// resolver_tests: loaded from resolver.rs
// registry_tests: loaded from registry.rs
// override_tests: loaded from overrides.rs
