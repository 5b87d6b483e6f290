//! JSON hierarchy files.
//!
//! A hierarchy file lists nominal types and their generic references:
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Map", "kind": "interface", "params": [{ "name": "K" }, { "name": "V" }],
//!       "methods": [{ "name": "put", "params": ["K", "V"] }] },
//!     { "name": "Base", "params": [{ "name": "A", "bounds": ["Number"] }],
//!       "extends": { "type": "HashMap", "args": ["A", "Integer"] },
//!       "fields": [{ "name": "last", "type": "A" }] }
//!   ]
//! }
//! ```
//!
//! Names inside a type resolve to that type's own parameters first, then to
//! declared types. `Object` is always declared; listing it only adds members.
//! A reference without `args` is raw.

use anyhow::{Context, Result, bail};
use genmap_solver::{ROOT_TYPE_NAME, TypeArg, TypeGraph, TypeGraphBuilder, TypeKey, TypeKind};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HierarchyFile {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Class,
    Interface,
}

impl From<DeclKind> for TypeKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Class => TypeKind::Class,
            DeclKind::Interface => TypeKind::Interface,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub extends: Option<ReferenceDecl>,
    #[serde(default)]
    pub implements: Vec<ReferenceDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceDecl {
    #[serde(rename = "type")]
    pub target: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

pub fn parse_hierarchy(source: &str) -> Result<TypeGraph> {
    let file: HierarchyFile =
        serde_json::from_str(source).context("failed to parse hierarchy JSON")?;
    build_graph(&file)
}

pub fn load_hierarchy(path: &Path) -> Result<TypeGraph> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read hierarchy: {}", path.display()))?;
    parse_hierarchy(&source)
        .with_context(|| format!("failed to load hierarchy: {}", path.display()))
}

/// Declare every type first so references may point forward.
pub fn build_graph(file: &HierarchyFile) -> Result<TypeGraph> {
    let mut builder = TypeGraphBuilder::new();
    let mut seen = FxHashSet::default();
    let mut keys = Vec::with_capacity(file.types.len());

    for decl in &file.types {
        if !seen.insert(decl.name.as_str()) {
            bail!("type '{}' is declared more than once", decl.name);
        }
        keys.push(declare(&mut builder, decl)?);
    }

    for (decl, &key) in file.types.iter().zip(&keys) {
        define(&mut builder, decl, key)
            .with_context(|| format!("in declaration of '{}'", decl.name))?;
    }

    let graph = builder.build();
    debug!(types = graph.len(), "hierarchy loaded");
    Ok(graph)
}

fn declare(builder: &mut TypeGraphBuilder, decl: &TypeDecl) -> Result<TypeKey> {
    if decl.name == ROOT_TYPE_NAME {
        if decl.kind != DeclKind::Class || !decl.params.is_empty() || decl.extends.is_some() {
            bail!("'{ROOT_TYPE_NAME}' is the root class and may only declare members");
        }
        return Ok(builder.object());
    }
    let mut params = FxHashSet::default();
    for param in &decl.params {
        if !params.insert(param.name.as_str()) {
            bail!("type '{}' declares parameter '{}' twice", decl.name, param.name);
        }
    }
    let slots: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
    Ok(builder.declare(&decl.name, decl.kind.into(), &slots))
}

fn define(builder: &mut TypeGraphBuilder, decl: &TypeDecl, key: TypeKey) -> Result<()> {
    for (index, param) in decl.params.iter().enumerate() {
        if param.bounds.is_empty() {
            continue;
        }
        let bounds = param
            .bounds
            .iter()
            .map(|bound| resolve_type(builder, bound))
            .collect::<Result<Vec<_>>>()?;
        builder.bound(key, index as u32, bounds);
    }

    if let Some(reference) = &decl.extends {
        let target = resolve_type(builder, &reference.target)?;
        if reference.args.is_empty() {
            builder.extends_raw(key, target);
        } else {
            let args = resolve_args(builder, key, &reference.args)?;
            builder.extends(key, target, args);
        }
    }

    for reference in &decl.implements {
        let target = resolve_type(builder, &reference.target)?;
        if reference.args.is_empty() {
            builder.implements_raw(key, target);
        } else {
            let args = resolve_args(builder, key, &reference.args)?;
            builder.implements(key, target, args);
        }
    }

    for method in &decl.methods {
        let params = resolve_args(builder, key, &method.params)?;
        builder.method(key, &method.name, params);
    }

    for field in &decl.fields {
        let ty = resolve_arg(builder, key, &field.ty)?;
        builder.field(key, &field.name, ty);
    }
    Ok(())
}

fn resolve_type(builder: &TypeGraphBuilder, name: &str) -> Result<TypeKey> {
    match builder.type_named(name) {
        Some(key) => Ok(key),
        None => bail!("unknown type '{name}'"),
    }
}

/// A parameter of `owner`, or else a declared type.
fn resolve_arg(builder: &TypeGraphBuilder, owner: TypeKey, name: &str) -> Result<TypeArg> {
    if let Some(index) = builder.slot_named(owner, name) {
        return Ok(TypeArg::slot(owner, index));
    }
    Ok(resolve_type(builder, name)?.into())
}

fn resolve_args(
    builder: &TypeGraphBuilder,
    owner: TypeKey,
    names: &[String],
) -> Result<Vec<TypeArg>> {
    names
        .iter()
        .map(|name| resolve_arg(builder, owner, name))
        .collect()
}
