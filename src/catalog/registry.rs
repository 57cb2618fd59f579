//! Class registry for looking up validated classes by name.

use crate::class::{Class, Object};
use crate::core::error::{DefinitionError, EngineError, EngineResult};
use crate::core::signature::Arguments;
use crate::validation::pipeline::StructureReport;
use indexmap::IndexMap;
use log::trace;
use std::sync::Arc;

/// Registry of built classes, keyed by qualified name.
///
/// Registration order is preserved. Registering a name twice replaces the
/// earlier class in place.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<Class>>,
}

impl ClassRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            classes: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in example classes.
    pub fn with_builtins() -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        crate::catalog::builtin::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Register a class under its qualified name.
    pub fn register(&mut self, class: Arc<Class>) {
        trace!("Registering class '{}'", class.name());
        self.classes.insert(class.name().to_string(), class);
    }

    /// Look up a class.
    pub fn get(&self, name: &str) -> Option<&Arc<Class>> {
        self.classes.get(name)
    }

    /// Check if a class is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// All registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(|s| s.as_str())
    }

    /// All registered classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<Class>> {
        self.classes.values()
    }

    /// Case-insensitive substring search over qualified names.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.classes
            .keys()
            .filter(|name| name.to_lowercase().contains(&query))
            .map(|s| s.as_str())
            .collect()
    }

    /// Registered classes deriving from `name`, excluding the class itself.
    pub fn subclasses_of(&self, name: &str) -> Vec<&Arc<Class>> {
        let Some(base) = self.classes.get(name) else {
            return Vec::new();
        };
        self.classes
            .values()
            .filter(|class| !Arc::ptr_eq(class, base) && class.is_subclass_of(base))
            .collect()
    }

    /// Remove a class. Returns whether it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.classes.shift_remove(name).is_some()
    }

    /// Construct an instance of a registered class.
    pub fn instantiate(&self, name: &str, args: Arguments) -> EngineResult<Object> {
        let class = self
            .classes
            .get(name)
            .ok_or_else(|| EngineError::UnknownClass(name.to_string()))?;
        Ok(class.instantiate(args)?)
    }

    /// Structural report for a registered class, without marking it checked.
    pub fn report(&self, name: &str) -> EngineResult<StructureReport> {
        let class = self
            .classes
            .get(name)
            .ok_or_else(|| EngineError::UnknownClass(name.to_string()))?;
        Ok(class.structure_pipeline().report(class))
    }

    /// Get the total number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::MODULE;
    use crate::class::ClassBuilder;

    fn name(class: &str) -> String {
        format!("{}.{}", MODULE, class)
    }

    #[test]
    fn test_with_builtins() {
        let registry = ClassRegistry::with_builtins().unwrap();
        assert!(!registry.is_empty());
        assert!(registry.contains(&name("ActionExample")));
        assert!(registry.contains(&name("MultiplierExample")));
        assert_eq!(registry.search("example").len(), registry.len());
        assert_eq!(registry.search("ADDER"), vec![name("AdderExample").as_str()]);
    }

    #[test]
    fn test_subclasses_of() {
        let registry = ClassRegistry::with_builtins().unwrap();
        let subclasses: Vec<&str> = registry
            .subclasses_of(&name("ActionExample"))
            .into_iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(
            subclasses,
            vec![
                name("AdderExample").as_str(),
                name("MultiplierExample").as_str(),
                name("InvalidExample").as_str(),
            ]
        );
        assert!(registry.subclasses_of("missing").is_empty());
    }

    #[test]
    fn test_instantiate_unknown() {
        let registry = ClassRegistry::new();
        let err = registry.instantiate("nope", Arguments::new()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownClass(ref n) if n == "nope"));
    }

    #[test]
    fn test_report_does_not_mark() {
        let registry = ClassRegistry::with_builtins().unwrap();
        let report = registry.report(&name("InvalidExample")).unwrap();
        assert!(!report.can_instantiate());
        assert_eq!(report.abstract_methods, vec!["action".to_string()]);

        let report = registry.report(&name("AdderExample")).unwrap();
        assert!(report.can_instantiate());
        assert!(!registry.get(&name("AdderExample")).unwrap().is_self_validated());
    }

    #[test]
    fn test_register_replace_and_unregister() {
        let mut registry = ClassRegistry::new();
        registry.register(ClassBuilder::new("m.A").build().unwrap());
        registry.register(ClassBuilder::new("m.A").build().unwrap());
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister("m.A"));
        assert!(!registry.unregister("m.A"));
        assert!(registry.is_empty());
    }
}
