//! Core types for validating-base.
//!
//! This module contains the foundational types the engine is built from:
//! - Dynamic values and type descriptors
//! - Method signatures and argument binding
//! - Per-class validation options
//! - Error types

pub mod types;
pub mod signature;
pub mod options;
pub mod error;

// Re-export commonly used types
pub use types::{CollectionCheck, TypeSpec, Value};
pub use signature::{Arguments, BoundArguments, Parameter, ParameterKind, Signature};
pub use options::ValidationOptions;
pub use error::{
    BindError, CallError, DefinitionError, EngineError, InstantiateError, MethodError,
    StructureError,
};
