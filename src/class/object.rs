//! Instances of validated classes.
//!
//! Instantiation is the wrapped initializer: abstract check, the one-time
//! structural self-check, then the initializer body. Method calls go through
//! the class's dispatch table so marked methods are always validated.

use crate::class::member::Member;
use crate::class::Class;
use crate::core::error::{CallError, CallResult, InstantiateError, MethodError};
use crate::core::signature::{Arguments, Signature};
use crate::core::types::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// An instance of a [`Class`].
pub struct Object {
    id: ObjectId,
    class: Arc<Class>,
    fields: IndexMap<String, Value>,
    self_validated: bool,
}

impl Class {
    /// Construct an instance.
    ///
    /// Fails with [`InstantiateError::Abstract`] while abstract methods
    /// remain, then with the first structural problem found by the
    /// self-check. The self-check runs on the first successful construction
    /// only. The initializer body never runs for a non-conformant class.
    pub fn instantiate(self: &Arc<Self>, args: Arguments) -> Result<Object, InstantiateError> {
        if self.is_abstract() {
            return Err(InstantiateError::Abstract {
                class: self.name.clone(),
                methods: self.abstract_methods.clone(),
            });
        }

        self.ensure_self_validated()?;

        let mut object = Object {
            id: ObjectId::new(),
            class: Arc::clone(self),
            fields: IndexMap::new(),
            self_validated: true,
        };

        match &self.initializer {
            Some(init) => {
                let bound = init
                    .signature
                    .bind(&args)
                    .map_err(|source| InstantiateError::Bind {
                        class: self.name.clone(),
                        source,
                    })?;
                init.invoke(&mut object, &bound)?;
            }
            None => {
                // The implicit initializer takes no arguments.
                Signature::new()
                    .bind(&args)
                    .map_err(|source| InstantiateError::Bind {
                        class: self.name.clone(),
                        source,
                    })?;
            }
        }

        Ok(object)
    }
}

impl Object {
    /// Instance identifier.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The class this object is an instance of.
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Whether the structural self-check passed for this instance.
    pub fn is_self_validated(&self) -> bool {
        self.self_validated
    }

    /// Whether this object is an instance of `class` or one of its subclasses.
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.class.is_subclass_of(class)
    }

    /// Read an instance field, falling back to a class attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).or_else(|| match self.class.resolve(name) {
            Some(resolved) => match &resolved.member {
                Member::Attribute(value) => Some(value),
                _ => None,
            },
            None => None,
        })
    }

    /// Set an instance field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Instance fields in assignment order.
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Call a method by name.
    ///
    /// Marked methods run through their [`ValidatedMethod`] proxy; anything
    /// else is bound and invoked directly.
    ///
    /// [`ValidatedMethod`]: crate::validation::dispatch::ValidatedMethod
    pub fn call(&mut self, name: &str, args: Arguments) -> CallResult<Value> {
        let class = Arc::clone(&self.class);

        if let Some(proxy) = class.validated_method(name) {
            return proxy.call(self, &args);
        }

        match class.resolve(name).map(|r| &r.member) {
            Some(Member::Method(method)) => {
                let bound = method.signature.bind(&args).map_err(|source| CallError::Bind {
                    method: format!("{}.{}", class.name(), name),
                    source,
                })?;
                Ok(method.invoke(self, &bound)?)
            }
            Some(Member::Abstract(_)) => Err(CallError::Raised(MethodError::NotImplemented(
                format!("'{}.{}' is abstract", class.name(), name),
            ))),
            Some(Member::Attribute(_)) => Err(CallError::NotCallable {
                class: class.name().to_string(),
                attribute: name.to_string(),
            }),
            None => Err(CallError::UnknownMethod {
                class: class.name().to_string(),
                method: name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .field("fields", &self.fields)
            .field("self_validated", &self.self_validated)
            .finish()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object {}>", self.class.name(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::builder::ClassBuilder;
    use crate::class::member::{AbstractMethod, Markable, Method};
    use crate::core::error::StructureError;
    use crate::core::signature::Parameter;
    use crate::core::types::TypeSpec;
    use crate::validation::stages::StructureStage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts how often the self-check reaches it.
    struct CountingStage {
        runs: Arc<AtomicUsize>,
    }

    impl StructureStage for CountingStage {
        fn name(&self) -> &str {
            "Counting"
        }

        fn check(&self, _class: &Class) -> Result<(), Vec<StructureError>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        }
    }

    fn counter_class(inits: Arc<AtomicUsize>) -> Arc<Class> {
        ClassBuilder::new("tests.Counter")
            .init(
                Signature::new().param(Parameter::new("start", TypeSpec::Integer).with_default(0i64)),
                move |obj, args| {
                    inits.fetch_add(1, Ordering::SeqCst);
                    obj.set("count", args.get_integer("start").unwrap_or(0));
                    Ok(Value::None)
                },
            )
            .method(Method::new("bump", Signature::new(), |obj, _| {
                let next = obj.get("count").and_then(Value::as_integer).unwrap_or(0) + 1;
                obj.set("count", next);
                Ok(Value::Integer(next))
            }))
            .attribute("label", "counter")
            .build()
            .unwrap()
    }

    #[test]
    fn test_instantiate_runs_initializer() {
        let inits = Arc::new(AtomicUsize::new(0));
        let class = counter_class(Arc::clone(&inits));

        assert!(!class.is_self_validated());
        let mut obj = class.instantiate(Arguments::new().arg(5i64)).unwrap();
        assert!(class.is_self_validated());
        assert!(obj.is_self_validated());
        assert_eq!(inits.load(Ordering::SeqCst), 1);

        assert_eq!(obj.call("bump", Arguments::new()).unwrap(), Value::Integer(6));
        assert_eq!(obj.get("count"), Some(&Value::Integer(6)));
        assert_eq!(obj.get("label"), Some(&Value::from("counter")));

        let second = class.instantiate(Arguments::new()).unwrap();
        assert_eq!(second.get("count"), Some(&Value::Integer(0)));
        assert_eq!(inits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_call_errors() {
        let class = counter_class(Arc::new(AtomicUsize::new(0)));
        let mut obj = class.instantiate(Arguments::new()).unwrap();

        let err = obj.call("missing", Arguments::new()).unwrap_err();
        assert!(matches!(err, CallError::UnknownMethod { .. }));

        let err = obj.call("label", Arguments::new()).unwrap_err();
        assert!(matches!(err, CallError::NotCallable { .. }));
        assert!(err.is_type_error());

        let err = obj.call("bump", Arguments::new().arg(1i64)).unwrap_err();
        assert!(matches!(err, CallError::Bind { .. }));
    }

    #[test]
    fn test_implicit_initializer_takes_no_arguments() {
        let class = ClassBuilder::new("tests.Empty").build().unwrap();
        assert!(class.instantiate(Arguments::new()).is_ok());

        let err = class.instantiate(Arguments::new().arg(1i64)).unwrap_err();
        assert!(matches!(err, InstantiateError::Bind { .. }));
    }

    #[test]
    fn test_abstract_class_rejected_before_initializer() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&inits);
        let class = ClassBuilder::new("tests.Shape")
            .abstract_method(AbstractMethod::new("area", Signature::new()))
            .init(Signature::new(), move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Value::None)
            })
            .build()
            .unwrap();

        let err = class.instantiate(Arguments::new()).unwrap_err();
        assert!(matches!(err, InstantiateError::Abstract { ref methods, .. } if methods == &["area"]));
        assert!(err.is_missing_implementation());
        assert_eq!(inits.load(Ordering::SeqCst), 0);
        assert!(!class.is_self_validated());
    }

    #[test]
    fn test_failed_self_check_is_retried() {
        let class = ClassBuilder::new("tests.Needy")
            .method(Method::new("run", Signature::new(), |_, _| Ok(Value::None)).prerun_validated())
            .build()
            .unwrap();

        for _ in 0..2 {
            let err = class.instantiate(Arguments::new()).unwrap_err();
            assert!(matches!(
                err.structure(),
                Some(StructureError::MissingValidator { validator, .. }) if validator == "validate_run"
            ));
        }
        assert!(!class.is_self_validated());
    }

    #[test]
    fn test_inherited_initializer_and_isinstance() {
        let inits = Arc::new(AtomicUsize::new(0));
        let base = counter_class(Arc::clone(&inits));
        let child = ClassBuilder::new("tests.SubCounter").extends(&base).build().unwrap();

        let obj = child.instantiate(Arguments::new().kwarg("start", 2i64)).unwrap();
        assert_eq!(obj.get("count"), Some(&Value::Integer(2)));
        assert!(obj.is_instance_of(&base));
        assert!(obj.is_instance_of(&child));
        assert!(!base.is_subclass_of(&child));
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_construction_checks_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let inits = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&inits);
        let class = ClassBuilder::new("tests.Shared")
            .stage(CountingStage {
                runs: Arc::clone(&runs),
            })
            .init(Signature::new(), move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Value::None)
            })
            .build()
            .unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| class.instantiate(Arguments::new())))
                .collect();
            for handle in handles {
                let obj = handle.join().unwrap().unwrap();
                assert!(obj.is_self_validated());
            }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(inits.load(Ordering::SeqCst), 8);
        assert!(class.is_self_validated());

        class.instantiate(Arguments::new()).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_required_method_blocks_initializer() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&inits);
        let class = ClassBuilder::new("tests.Loader")
            .require("load")
            .init(Signature::new(), move |_, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(Value::None)
            })
            .build()
            .unwrap();

        let err = class.instantiate(Arguments::new()).unwrap_err();
        assert!(err.is_missing_implementation());
        assert_eq!(
            err.structure(),
            Some(&StructureError::MissingMethod {
                class: "tests.Loader".to_string(),
                method: "load".to_string(),
            })
        );
        assert_eq!(inits.load(Ordering::SeqCst), 0);
        assert!(!class.is_self_validated());

        let child = ClassBuilder::new("tests.FileLoader")
            .extends(&class)
            .method(Method::new("load", Signature::new(), |_, _| Ok(Value::None)))
            .build()
            .unwrap();
        assert!(child.instantiate(Arguments::new()).is_ok());
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }
}
