//! Class construction.
//!
//! [`ClassBuilder`] plays the part of a class statement: collect the body,
//! then [`build`](ClassBuilder::build) once to get an immutable [`Class`]
//! with its validated-method sets merged from every ancestor and its
//! validated methods already wrapped.

use crate::class::marker::validator_name;
use crate::class::member::{AbstractMethod, Member, Method};
use crate::class::mro::linearize;
use crate::class::object::Object;
use crate::class::{Class, ResolvedMember};
use crate::core::error::{DefinitionError, MethodResult};
use crate::core::options::ValidationOptions;
use crate::core::signature::{BoundArguments, Signature};
use crate::core::types::Value;
use crate::validation::dispatch::{ValidatedMethod, Validator};
use crate::validation::stages::StructureStage;
use indexmap::{IndexMap, IndexSet};
use log::trace;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Class attributes of the list-based declaration style, rejected outright.
pub const DEPRECATED_ATTRIBUTES: [&str; 2] = ["required_methods", "validated_methods"];

/// Builder for a [`Class`].
pub struct ClassBuilder {
    name: String,
    bases: Vec<Arc<Class>>,
    members: IndexMap<String, Member>,
    duplicate_members: Vec<String>,
    required: Vec<String>,
    initializer: Option<Method>,
    options: Option<ValidationOptions>,
    stages: Vec<Arc<dyn StructureStage>>,
}

impl ClassBuilder {
    /// Start a class with a qualified name, e.g. `"shapes.Square"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            members: IndexMap::new(),
            duplicate_members: Vec::new(),
            required: Vec::new(),
            initializer: None,
            options: None,
            stages: Vec::new(),
        }
    }

    /// Add a base class. Bases are searched in the order they are added.
    pub fn extends(mut self, base: &Arc<Class>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Define a method.
    pub fn method(self, method: Method) -> Self {
        let name = method.name.clone();
        self.member(name, Member::Method(method))
    }

    /// Declare an abstract method that concrete subclasses must override.
    pub fn abstract_method(self, method: AbstractMethod) -> Self {
        let name = method.name.clone();
        self.member(name, Member::Abstract(method))
    }

    /// Define a plain, non-callable class attribute.
    pub fn attribute(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.member(name.into(), Member::Attribute(value.into()))
    }

    /// Require a method by name without declaring it abstract.
    ///
    /// Requirements accumulate down the hierarchy; the self-check rejects
    /// instantiation until the name resolves to a callable.
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Define the initializer run on every instantiation.
    pub fn init<F>(mut self, signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Object, &BoundArguments) -> MethodResult<Value> + Send + Sync + 'static,
    {
        self.initializer = Some(Method::new("__init__", signature, body));
        self
    }

    /// Set validation options for this class and, by inheritance, its subclasses.
    pub fn options(mut self, options: ValidationOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Add a structural check run by the self-check after the standard ones.
    ///
    /// Stages are inherited: a subclass runs its ancestors' stages first.
    pub fn stage(mut self, stage: impl StructureStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    fn member(mut self, name: String, member: Member) -> Self {
        if self.members.insert(name.clone(), member).is_some() {
            self.duplicate_members.push(name);
        }
        self
    }

    /// Build the class.
    ///
    /// Runs exactly once per class definition and never creates an instance.
    pub fn build(self) -> Result<Arc<Class>, DefinitionError> {
        for attribute in DEPRECATED_ATTRIBUTES {
            if self.members.contains_key(attribute) {
                return Err(DefinitionError::Deprecated {
                    class: self.name,
                    attribute: attribute.to_string(),
                });
            }
        }

        if let Some(member) = self.duplicate_members.first() {
            return Err(DefinitionError::DuplicateMember {
                class: self.name.clone(),
                member: member.clone(),
            });
        }

        for (i, base) in self.bases.iter().enumerate() {
            if self.bases[..i].iter().any(|b| Arc::ptr_eq(b, base)) {
                return Err(DefinitionError::DuplicateBase {
                    class: self.name.clone(),
                    base: base.name().to_string(),
                });
            }
        }

        let mro = linearize(&self.name, &self.bases)?;

        // First definition along [self, mro...] wins.
        let mut resolved: IndexMap<String, ResolvedMember> = IndexMap::new();
        for (name, member) in &self.members {
            resolved.insert(
                name.clone(),
                ResolvedMember {
                    member: member.clone(),
                    owner: self.name.clone(),
                },
            );
        }
        for ancestor in &mro {
            for (name, member) in &ancestor.own_members {
                resolved
                    .entry(name.clone())
                    .or_insert_with(|| ResolvedMember {
                        member: member.clone(),
                        owner: ancestor.name.clone(),
                    });
            }
        }

        let mut prerun_methods = BTreeSet::new();
        let mut type_methods = BTreeSet::new();
        for (name, member) in &self.members {
            let markers = member.markers();
            if markers.prerun {
                prerun_methods.insert(name.clone());
            }
            if markers.typed {
                type_methods.insert(name.clone());
            }
        }
        for base in &self.bases {
            prerun_methods.extend(base.prerun_methods.iter().cloned());
            type_methods.extend(base.type_methods.iter().cloned());
        }

        let mut required_methods = IndexSet::new();
        for base in &self.bases {
            required_methods.extend(base.required_methods.iter().cloned());
        }
        required_methods.extend(self.required.iter().cloned());

        let abstract_methods: Vec<String> = resolved
            .iter()
            .filter(|(_, r)| matches!(r.member, Member::Abstract(_)))
            .map(|(name, _)| name.clone())
            .collect();

        let initializer = self
            .initializer
            .clone()
            .or_else(|| mro.iter().find_map(|c| c.own_initializer.clone()));

        let options = self
            .options
            .or_else(|| mro.iter().find_map(|c| c.own_options))
            .unwrap_or_default();

        let mut stages: Vec<Arc<dyn StructureStage>> = Vec::new();
        for stage in self.bases.iter().flat_map(|b| b.stages.iter()).chain(&self.stages) {
            if !stages.iter().any(|s| Arc::ptr_eq(s, stage)) {
                stages.push(Arc::clone(stage));
            }
        }

        let mut dispatch = IndexMap::new();
        for name in prerun_methods.union(&type_methods) {
            let Some(ResolvedMember {
                member: Member::Method(method),
                ..
            }) = resolved.get(name)
            else {
                // Abstract or non-callable: instantiation is rejected before
                // any call can reach this name.
                continue;
            };

            let validator = if prerun_methods.contains(name) {
                let validator_name = validator_name(name);
                match resolved.get(&validator_name) {
                    Some(ResolvedMember {
                        member: Member::Method(validator),
                        owner,
                    }) => Some(Validator {
                        qualname: format!("{}.{}", owner, validator_name),
                        method: validator.clone(),
                    }),
                    _ => None,
                }
            } else {
                None
            };

            dispatch.insert(
                name.clone(),
                ValidatedMethod {
                    class: self.name.clone(),
                    qualname: format!("{}.{}", self.name, name),
                    method: method.clone(),
                    prerun: prerun_methods.contains(name),
                    validator,
                    typed: type_methods.contains(name),
                    collection_check: options.collection_check,
                },
            );
        }

        trace!(
            "Built class '{}' (prerun: {:?}, type: {:?}, abstract: {:?})",
            self.name,
            prerun_methods,
            type_methods,
            abstract_methods
        );

        Ok(Arc::new(Class {
            name: self.name,
            bases: self.bases,
            mro,
            own_members: self.members,
            resolved,
            prerun_methods,
            type_methods,
            required_methods,
            abstract_methods,
            own_initializer: self.initializer,
            initializer,
            own_options: self.options,
            options,
            dispatch,
            stages,
            self_validated: Mutex::new(false),
        }))
    }
}
