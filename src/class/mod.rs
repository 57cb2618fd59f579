//! Validated classes.
//!
//! A [`Class`] is produced once by [`ClassBuilder::build`] and never changes
//! afterwards. Building is where the engine does its work:
//! - the method resolution order is linearized
//! - own and inherited members are resolved
//! - prerun and type validated method sets are merged with every ancestor's
//! - validated methods are wrapped in [`ValidatedMethod`] proxies
//!
//! The structural self-check runs later, on first instantiation.

pub mod builder;
pub mod marker;
pub mod member;
mod mro;
pub mod object;

pub use builder::ClassBuilder;
pub use marker::{validator_name, Marker, Markers};
pub use member::{
    prerun_validated, type_validated, validated, AbstractMethod, Markable, Member, Method,
    MethodFn,
};
pub use object::{Object, ObjectId};

use crate::core::error::StructureError;
use crate::core::options::ValidationOptions;
use crate::validation::dispatch::ValidatedMethod;
use crate::validation::pipeline::StructurePipeline;
use crate::validation::stages::StructureStage;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A member as seen from a class, with the name of the class defining it.
#[derive(Debug, Clone)]
pub struct ResolvedMember {
    /// The member itself
    pub member: Member,
    /// Qualified name of the class whose body defines the member
    pub owner: String,
}

/// An immutable, fully resolved class description.
pub struct Class {
    name: String,
    bases: Vec<Arc<Class>>,
    mro: Vec<Arc<Class>>,
    own_members: IndexMap<String, Member>,
    resolved: IndexMap<String, ResolvedMember>,
    prerun_methods: BTreeSet<String>,
    type_methods: BTreeSet<String>,
    required_methods: IndexSet<String>,
    abstract_methods: Vec<String>,
    own_initializer: Option<Method>,
    initializer: Option<Method>,
    own_options: Option<ValidationOptions>,
    options: ValidationOptions,
    dispatch: IndexMap<String, ValidatedMethod>,
    stages: Vec<Arc<dyn StructureStage>>,
    self_validated: Mutex<bool>,
}

impl Class {
    /// Qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases in declaration order.
    pub fn bases(&self) -> &[Arc<Class>] {
        &self.bases
    }

    /// Ancestors in method resolution order, excluding this class.
    pub fn mro(&self) -> &[Arc<Class>] {
        &self.mro
    }

    /// Members defined in this class's own body.
    pub fn own_members(&self) -> &IndexMap<String, Member> {
        &self.own_members
    }

    /// Look up a member through the resolution order.
    pub fn resolve(&self, name: &str) -> Option<&ResolvedMember> {
        self.resolved.get(name)
    }

    /// Every visible member name, own members first.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.resolved.keys().map(|s| s.as_str())
    }

    /// Names of methods requiring a `validate_<name>` check.
    pub fn prerun_methods(&self) -> &BTreeSet<String> {
        &self.prerun_methods
    }

    /// Names of methods whose arguments and result are type checked.
    pub fn type_methods(&self) -> &BTreeSet<String> {
        &self.type_methods
    }

    /// Names that must resolve to callables, in declaration order.
    pub fn required_methods(&self) -> &IndexSet<String> {
        &self.required_methods
    }

    /// Abstract methods without a concrete override.
    pub fn abstract_methods(&self) -> &[String] {
        &self.abstract_methods
    }

    /// Whether instantiation is blocked by abstract methods.
    pub fn is_abstract(&self) -> bool {
        !self.abstract_methods.is_empty()
    }

    /// Effective validation options.
    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// The validating proxy for a method, if the method is marked.
    pub fn validated_method(&self, name: &str) -> Option<&ValidatedMethod> {
        self.dispatch.get(name)
    }

    /// The initializer in effect, own or inherited.
    pub fn initializer(&self) -> Option<&Method> {
        self.initializer.as_ref()
    }

    /// Whether a subclass relation holds (a class is its own subclass).
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        std::ptr::eq(self, other) || self.mro.iter().any(|c| std::ptr::eq(c.as_ref(), other))
    }

    /// The self-check pipeline: standard stages, then inherited and own
    /// custom stages.
    pub fn structure_pipeline(&self) -> StructurePipeline {
        let mut pipeline = StructurePipeline::default();
        for stage in &self.stages {
            pipeline.add_stage(Arc::clone(stage));
        }
        pipeline
    }

    /// Whether the structural self-check has already passed.
    pub fn is_self_validated(&self) -> bool {
        *self.self_validated.lock()
    }

    /// Run the structural self-check once.
    ///
    /// The flag is held locked for the duration of the check, so concurrent
    /// first constructions run it exactly once. A failing check leaves the
    /// flag unset.
    pub(crate) fn ensure_self_validated(&self) -> Result<(), StructureError> {
        let mut validated = self.self_validated.lock();
        if !*validated {
            self.structure_pipeline().ensure(self)?;
            *validated = true;
        }
        Ok(())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bases: Vec<&str> = self.bases.iter().map(|b| b.name()).collect();
        let stages: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("bases", &bases)
            .field("prerun_methods", &self.prerun_methods)
            .field("type_methods", &self.type_methods)
            .field("required_methods", &self.required_methods)
            .field("abstract_methods", &self.abstract_methods)
            .field("options", &self.options)
            .field("stages", &stages)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name)
    }
}
