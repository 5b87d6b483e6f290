//! Command-line support for the genmap binary.

pub mod args;
pub mod driver;
pub mod hierarchy;

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "tests/hierarchy_tests.rs"]
mod hierarchy_tests;
