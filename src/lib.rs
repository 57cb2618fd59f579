//! # validating-base - Declarative method validation
//!
//! A class declares once which of its methods need a business-rule check, a
//! type check, or both. Every subclass then gets those checks injected
//! without the method bodies containing any validation code.
//!
//! ## Features
//!
//! - **Markers**: tag a method `prerun_validated`, `type_validated` or `validated`
//! - **Inheritance**: marked sets are merged along the method resolution order,
//!   so a method marked once is validated in every subclass
//! - **Self-check**: before a class's first instance is built, required
//!   methods and `validate_<name>` validators are checked to exist and fit
//! - **Call interception**: validator, argument types, body, return type
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use validating_base::prelude::*;
//!
//! let number_list = || Signature::new()
//!     .param(Parameter::new("number_list", TypeSpec::list(TypeSpec::Integer)));
//!
//! let base = ClassBuilder::new("shapes.Action")
//!     .abstract_method(AbstractMethod::new("action", number_list().returning(TypeSpec::Integer)).validated())
//!     .method(Method::new("validate_action", number_list().returning(TypeSpec::None), |_, _| Ok(Value::None)))
//!     .build()?;
//!
//! let adder = ClassBuilder::new("shapes.Adder")
//!     .extends(&base)
//!     .method(Method::new("action", number_list().returning(TypeSpec::Integer), |_, args| {
//!         let total = args.get_list("number_list").unwrap_or_default().iter()
//!             .filter_map(Value::as_integer).sum::<i64>();
//!         Ok(Value::Integer(total))
//!     }))
//!     .build()?;
//!
//! let mut obj = adder.instantiate(Arguments::new())?;
//! let sum = obj.call("action", Arguments::new().arg(vec![1i64, 2, 3]))?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: values, type descriptors, signatures, options and errors
//! - [`class`]: markers, members, the class builder and instances
//! - [`validation`]: the structural self-check and the call proxy
//! - [`catalog`]: class registry and built-in example classes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod class;
pub mod core;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use validating_base::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{CollectionCheck, TypeSpec, Value};
    pub use crate::core::signature::{
        Arguments, BoundArguments, Parameter, ParameterKind, Signature,
    };
    pub use crate::core::options::ValidationOptions;

    // Errors
    pub use crate::core::error::{
        BindError, CallError, CallResult, DefinitionError, EngineError, EngineResult,
        InstantiateError, MethodError, MethodResult, StructureError,
    };

    // Classes
    pub use crate::class::{
        prerun_validated, type_validated, validated, AbstractMethod, Class, ClassBuilder,
        Markable, Marker, Member, Method, Object, ObjectId,
    };

    // Validation
    pub use crate::validation::dispatch::ValidatedMethod;
    pub use crate::validation::pipeline::{StructurePipeline, StructureReport};
    pub use crate::validation::stages::StructureStage;

    // Catalog
    pub use crate::catalog::registry::ClassRegistry;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
