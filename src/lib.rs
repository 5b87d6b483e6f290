//! genmap: generic parameter mapping over nominal type hierarchies.
//!
//! The solver lives in `genmap-solver`; this crate adds the hierarchy file
//! format, tracing setup and the `genmap` command line.

pub mod cli;
pub mod tracing_config;

pub use genmap_solver as solver;
