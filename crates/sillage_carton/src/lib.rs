//! # sillage_carton
//!
//! Carton - The analyst's toolbox for Sillage.
//!
//! This crate provides the foundational utilities for the Sillage
//! change-impact analyzer, much like a carton (artist's portfolio case)
//! holds the essential tools and materials for the work.
//!
//! # Modules
//!
//! - **hash**: content fingerprinting for declaration-level change detection
//! - **paths**: lexical path resolution used by module specifier handling
//! - **fs**: small filesystem helpers shared across the workspace

pub mod fs;
pub mod hash;
pub mod paths;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};
