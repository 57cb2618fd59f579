//! Catalog module.
//!
//! Contains the class registry and the built-in example classes.

pub mod registry;
pub mod builtin;

pub use registry::ClassRegistry;
