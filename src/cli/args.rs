use clap::{Parser, Subcommand};
use genmap_common::limits::{MAX_HIERARCHY_DEPTH, MAX_HIERARCHY_ITERATIONS};
use genmap_solver::RegistryConfig;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the genmap binary.
#[derive(Parser, Debug)]
#[command(
    name = "genmap",
    version,
    about = "Resolve generic parameter mappings and overrides over a type hierarchy"
)]
pub struct CliArgs {
    /// Hierarchy file (JSON) describing the types to query.
    pub file: PathBuf,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Deepest ancestor chain accepted before the hierarchy is rejected.
    #[arg(long = "max-depth", global = true, default_value_t = MAX_HIERARCHY_DEPTH)]
    pub max_depth: u32,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_depth: self.max_depth,
            max_iterations: MAX_HIERARCHY_ITERATIONS,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the supertype chain, interface set and mapping table of a type.
    Ancestors {
        #[arg(value_name = "TYPE")]
        ty: String,
    },

    /// Print how parameter INDEX of ANCESTOR resolves from TYPE.
    Mapping {
        #[arg(value_name = "TYPE")]
        ty: String,
        ancestor: String,
        index: usize,
    },

    /// Check whether DERIVED overrides BASE, e.g. `Map.put(K,V) Base.put(A,Integer)`.
    Overrides { base: MemberSpec, derived: MemberSpec },

    /// List the ancestor members a member overrides.
    BaseMembers { member: MemberSpec },
}

/// A member written as `Type.name(P1, P2)`.
///
/// Parameter names resolve like hierarchy file names: parameters of `Type`
/// first, then declared types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSpec {
    pub owner: String,
    pub name: String,
    pub params: Vec<String>,
}

impl FromStr for MemberSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, rest) = s
            .split_once('(')
            .ok_or_else(|| format!("expected `Type.name(...)`, got '{s}'"))?;
        let params = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("missing closing parenthesis in '{s}'"))?;
        let (owner, name) = head
            .trim()
            .rsplit_once('.')
            .ok_or_else(|| format!("expected `Type.name(...)`, got '{s}'"))?;
        let (owner, name) = (owner.trim(), name.trim());
        if owner.is_empty() || name.is_empty() {
            return Err(format!("expected `Type.name(...)`, got '{s}'"));
        }

        let params = if params.trim().is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(|p| match p.trim() {
                    "" => Err(format!("empty parameter in '{s}'")),
                    p => Ok(p.to_string()),
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            params,
        })
    }
}

impl fmt::Display for MemberSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.owner, self.name, self.params.join(", "))
    }
}
