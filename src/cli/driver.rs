//! Command execution against one loaded hierarchy.

use anyhow::{Context, Result, anyhow};
use genmap_solver::{
    GenericParameterMapping, MemberSignature, OverrideResolver, RegistryConfig, TypeArg,
    TypeGraph, TypeKey, TypeRegistry,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::args::{Command, MemberSpec};
use super::hierarchy::load_hierarchy;

/// A loaded hierarchy together with the registry answering queries on it.
///
/// The binary builds exactly one session, so the registry is the process-wide
/// cache for the run.
pub struct Session {
    graph: Arc<TypeGraph>,
    registry: TypeRegistry,
}

impl Session {
    pub fn new(graph: Arc<TypeGraph>, config: RegistryConfig) -> Self {
        let registry = TypeRegistry::with_config(graph.clone(), config);
        Self { graph, registry }
    }

    pub fn load(path: &Path, config: RegistryConfig) -> Result<Self> {
        let graph = load_hierarchy(path)?;
        Ok(Self::new(Arc::new(graph), config))
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn run(&self, command: &Command) -> Result<Report> {
        match command {
            Command::Ancestors { ty } => self.ancestors(ty),
            Command::Mapping {
                ty,
                ancestor,
                index,
            } => self.mapping(ty, ancestor, *index),
            Command::Overrides { base, derived } => self.overrides(base, derived),
            Command::BaseMembers { member } => self.base_members(member),
        }
    }

    fn ancestors(&self, name: &str) -> Result<Report> {
        let ty = self.type_named(name)?;
        let data = self
            .registry
            .register(ty)
            .with_context(|| format!("failed to resolve ancestors of '{name}'"))?;
        let mappings = data
            .mappings()
            .iter()
            .map(|(&ancestor, mappings)| AncestorEntry {
                ancestor: self.graph.name_of(ancestor).to_string(),
                params: mappings
                    .iter()
                    .map(|&m| self.graph.display_mapping(ty, m))
                    .collect(),
            })
            .collect();
        Ok(Report::Ancestors {
            ty: name.to_string(),
            supertypes: self.names(data.supertypes().iter().copied()),
            interfaces: self.names(data.interfaces().iter().copied()),
            mappings,
        })
    }

    fn mapping(&self, name: &str, ancestor_name: &str, index: usize) -> Result<Report> {
        let ty = self.type_named(name)?;
        let ancestor = self.type_named(ancestor_name)?;
        let mapping = self
            .registry
            .mapping_for(ty, ancestor, index)
            .with_context(|| format!("failed to map {ancestor_name}[{index}] from '{name}'"))?;
        let resolved = match mapping {
            GenericParameterMapping::DerivedIndex(slot) => MappingView::DerivedIndex {
                index: slot,
                name: self.graph.display_mapping(ty, mapping),
            },
            GenericParameterMapping::Concrete(key) => MappingView::Concrete {
                name: self.graph.name_of(key).to_string(),
            },
        };
        Ok(Report::Mapping {
            ty: name.to_string(),
            ancestor: ancestor_name.to_string(),
            index,
            resolved,
        })
    }

    fn overrides(&self, base: &MemberSpec, derived: &MemberSpec) -> Result<Report> {
        let base_member = self.member(base)?;
        let derived_member = self.member(derived)?;
        let overrides = OverrideResolver::new(&self.registry)
            .overrides(&base_member, &derived_member)
            .with_context(|| format!("failed to compare {base} with {derived}"))?;
        Ok(Report::Overrides {
            base: self.graph.display_member(&base_member),
            derived: self.graph.display_member(&derived_member),
            overrides,
        })
    }

    fn base_members(&self, spec: &MemberSpec) -> Result<Report> {
        let member = self.member(spec)?;
        let found = OverrideResolver::new(&self.registry)
            .find_base_members(&member)
            .with_context(|| format!("failed to search base members of {spec}"))?;
        Ok(Report::BaseMembers {
            member: self.graph.display_member(&member),
            base_members: found
                .iter()
                .map(|m| self.graph.display_member(m))
                .collect(),
        })
    }

    fn type_named(&self, name: &str) -> Result<TypeKey> {
        self.graph
            .type_named(name)
            .ok_or_else(|| anyhow!("unknown type '{name}'"))
    }

    /// Look up the member `spec` names, matching its parameter list exactly.
    pub fn member(&self, spec: &MemberSpec) -> Result<MemberSignature> {
        let owner = self.type_named(&spec.owner)?;
        let params = spec
            .params
            .iter()
            .map(|p| match self.graph.slot_named(owner, p) {
                Some(index) => Ok(TypeArg::slot(owner, index)),
                None => self.type_named(p).map(TypeArg::from),
            })
            .collect::<Result<Vec<_>>>()?;
        self.graph
            .member(owner, &spec.name, &params)
            .cloned()
            .ok_or_else(|| anyhow!("'{}' declares no member {spec}", spec.owner))
    }

    fn names(&self, keys: impl Iterator<Item = TypeKey>) -> Vec<String> {
        keys.map(|k| self.graph.name_of(k).to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestorEntry {
    pub ancestor: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingView {
    DerivedIndex { index: usize, name: String },
    Concrete { name: String },
}

/// Result of one command, printable as text or serializable as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Report {
    Ancestors {
        #[serde(rename = "type")]
        ty: String,
        supertypes: Vec<String>,
        interfaces: Vec<String>,
        mappings: Vec<AncestorEntry>,
    },
    Mapping {
        #[serde(rename = "type")]
        ty: String,
        ancestor: String,
        index: usize,
        resolved: MappingView,
    },
    Overrides {
        base: String,
        derived: String,
        overrides: bool,
    },
    BaseMembers {
        member: String,
        base_members: Vec<String>,
    },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Ancestors {
                ty,
                supertypes,
                interfaces,
                mappings,
            } => {
                writeln!(f, "{ty}")?;
                writeln!(f, "  supertypes: {}", supertypes.join(", "))?;
                writeln!(f, "  interfaces: {}", interfaces.join(", "))?;
                writeln!(f, "  mappings:")?;
                for entry in mappings {
                    writeln!(f, "    {}<{}>", entry.ancestor, entry.params.join(", "))?;
                }
                Ok(())
            }
            Report::Mapping {
                ty,
                ancestor,
                index,
                resolved,
            } => match resolved {
                MappingView::DerivedIndex { index: slot, name } => {
                    writeln!(f, "{ancestor}[{index}] from {ty} = {name} (parameter {slot})")
                }
                MappingView::Concrete { name } => {
                    writeln!(f, "{ancestor}[{index}] from {ty} = {name}")
                }
            },
            Report::Overrides {
                base,
                derived,
                overrides,
            } => {
                let verb = if *overrides { "overrides" } else { "does not override" };
                writeln!(f, "{derived} {verb} {base}")
            }
            Report::BaseMembers {
                member,
                base_members,
            } => {
                if base_members.is_empty() {
                    return writeln!(f, "{member} overrides nothing");
                }
                writeln!(f, "{member} overrides:")?;
                for base in base_members {
                    writeln!(f, "  {base}")?;
                }
                Ok(())
            }
        }
    }
}
