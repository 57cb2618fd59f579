//! Method signatures and argument binding.
//!
//! A [`Signature`] describes the parameters a method accepts (the receiver is
//! implicit and never listed) together with their optional type annotations.
//! Calls supply [`Arguments`], which are bound against the signature into
//! [`BoundArguments`] before anything else happens.

use crate::core::error::BindError;
use crate::core::types::{TypeSpec, Value};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// How a parameter may be supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Positionally or by name.
    #[default]
    PositionalOrKeyword,
    /// Only by name.
    KeywordOnly,
}

/// A single declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Declared type, if annotated
    pub annotation: Option<TypeSpec>,
    /// How the parameter is supplied
    pub kind: ParameterKind,
    /// Value used when the caller omits the argument
    pub default: Option<Value>,
}

impl Parameter {
    /// Create an annotated positional-or-keyword parameter.
    pub fn new(name: impl Into<String>, annotation: TypeSpec) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
            kind: ParameterKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// Create a parameter without a type annotation.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            kind: ParameterKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// Make the parameter keyword-only.
    pub fn keyword_only(mut self) -> Self {
        self.kind = ParameterKind::KeywordOnly;
        self
    }

    /// Give the parameter a default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Parameters plus return annotation of a method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Signature {
    /// Declared parameters in order
    pub parameters: Vec<Parameter>,
    /// Declared return type; `None` means unannotated
    pub returns: Option<TypeSpec>,
}

impl Signature {
    /// An empty, unannotated signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the return annotation.
    pub fn returning(mut self, returns: TypeSpec) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Find a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Whether two signatures declare identical parameter lists.
    ///
    /// Names, kinds, annotations, and defaults all take part; the return
    /// annotation does not.
    pub fn same_parameters(&self, other: &Signature) -> bool {
        self.parameters == other.parameters
    }

    /// Bind caller-supplied arguments to the declared parameters.
    ///
    /// Positional arguments fill positional-or-keyword parameters in order,
    /// keywords fill by name, and remaining parameters take their defaults.
    pub fn bind(&self, args: &Arguments) -> Result<BoundArguments, BindError> {
        let positional_slots: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::PositionalOrKeyword)
            .collect();

        if args.positional.len() > positional_slots.len() {
            return Err(BindError::TooManyPositional {
                expected: positional_slots.len(),
                got: args.positional.len(),
            });
        }

        let mut values: IndexMap<String, Value> = IndexMap::new();
        for (param, value) in positional_slots.iter().zip(&args.positional) {
            values.insert(param.name.clone(), value.clone());
        }

        for (name, value) in &args.keyword {
            if self.get_parameter(name).is_none() {
                return Err(BindError::UnexpectedKeyword(name.clone()));
            }
            if values.contains_key(name) {
                return Err(BindError::MultipleValues(name.clone()));
            }
            values.insert(name.clone(), value.clone());
        }

        // Re-collect in declaration order, filling defaults.
        let mut bound = IndexMap::with_capacity(self.parameters.len());
        let mut defaulted = IndexSet::new();
        for param in &self.parameters {
            match values.shift_remove(&param.name) {
                Some(value) => {
                    bound.insert(param.name.clone(), value);
                }
                None => match &param.default {
                    Some(default) => {
                        bound.insert(param.name.clone(), default.clone());
                        defaulted.insert(param.name.clone());
                    }
                    None => return Err(BindError::MissingArgument(param.name.clone())),
                },
            }
        }

        Ok(BoundArguments {
            values: bound,
            defaulted,
        })
    }
}

/// Arguments exactly as the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    /// Positional arguments in order
    pub positional: Vec<Value>,
    /// Keyword arguments in the order supplied
    pub keyword: IndexMap<String, Value>,
}

impl Arguments {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments from a list of positional values.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keyword: IndexMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Total number of supplied arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Check if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arguments matched to parameter names, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    values: IndexMap<String, Value>,
    defaulted: IndexSet<String>,
}

impl BoundArguments {
    /// Get a bound value by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get a bound value as an integer.
    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_integer)
    }

    /// Get a bound value as a float.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    /// Get a bound value as a string.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_string)
    }

    /// Get a bound value as a list.
    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// Whether the caller supplied `name` rather than it taking its default.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.values.contains_key(name) && !self.defaulted.contains(name)
    }

    /// Iterate over `(name, value)` pairs the caller supplied.
    pub fn supplied(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(name, _)| !self.defaulted.contains(*name))
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Signature {
        Signature::new()
            .param(Parameter::new("a", TypeSpec::Integer))
            .param(Parameter::new("b", TypeSpec::String).with_default("x"))
            .param(Parameter::untyped("flag").keyword_only().with_default(false))
            .returning(TypeSpec::Integer)
    }

    #[test]
    fn test_bind_positional_and_defaults() {
        let bound = sample().bind(&Arguments::new().arg(1i64)).unwrap();
        assert_eq!(bound.get_integer("a"), Some(1));
        assert_eq!(bound.get_string("b"), Some("x"));
        assert_eq!(bound.get("flag"), Some(&Value::Boolean(false)));
        let names: Vec<&str> = bound.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b", "flag"]);

        assert!(bound.is_supplied("a"));
        assert!(!bound.is_supplied("b"));
        assert!(!bound.is_supplied("missing"));
        let supplied: Vec<&str> = bound.supplied().map(|(n, _)| n).collect();
        assert_eq!(supplied, ["a"]);
    }

    #[test]
    fn test_bind_keywords() {
        let args = Arguments::new().kwarg("flag", true).kwarg("a", 3i64);
        let bound = sample().bind(&args).unwrap();
        assert_eq!(bound.get_integer("a"), Some(3));
        assert_eq!(bound.get("flag"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_bind_errors() {
        let sig = sample();

        let err = sig.bind(&Arguments::new()).unwrap_err();
        assert!(matches!(err, BindError::MissingArgument(ref n) if n == "a"));

        // keyword-only parameters cannot be filled positionally
        let err = sig
            .bind(&Arguments::new().arg(1i64).arg("y").arg(true))
            .unwrap_err();
        assert!(matches!(err, BindError::TooManyPositional { expected: 2, got: 3 }));

        let err = sig.bind(&Arguments::new().arg(1i64).kwarg("a", 2i64)).unwrap_err();
        assert!(matches!(err, BindError::MultipleValues(ref n) if n == "a"));

        let err = sig.bind(&Arguments::new().kwarg("zzz", 2i64)).unwrap_err();
        assert!(matches!(err, BindError::UnexpectedKeyword(ref n) if n == "zzz"));
    }

    #[test]
    fn test_same_parameters_ignores_return() {
        let a = sample();
        let b = Signature {
            returns: Some(TypeSpec::None),
            ..sample()
        };
        assert!(a.same_parameters(&b));

        let c = Signature::new().param(Parameter::new("a", TypeSpec::Float));
        assert!(!a.same_parameters(&c));
    }
}
