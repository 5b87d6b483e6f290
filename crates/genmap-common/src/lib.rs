//! Common types and utilities for genmap.
//!
//! This crate provides foundational types used across all genmap crates:
//! - String interning (`Atom`, `Interner`) for type, slot and member names
//! - Hierarchy limits shared by the solver and the CLI

// String interning for name deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;
