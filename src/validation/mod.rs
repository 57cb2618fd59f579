//! Validation machinery.
//!
//! - [`pipeline`] and [`stages`]: the structural self-check run before a
//!   class's first instance is constructed
//! - [`dispatch`]: the proxy every call to a marked method passes through
//! - [`typecheck`]: argument and return checks used by the proxy

pub mod dispatch;
pub mod pipeline;
pub mod stages;
pub mod typecheck;

pub use dispatch::{ValidatedMethod, Validator};
pub use pipeline::{StructurePipeline, StructureReport};
pub use stages::{PrerunValidators, RequiredMethods, StructureStage, TypeValidatedMethods};
pub use typecheck::{check_arguments, check_return};
