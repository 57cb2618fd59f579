//! Class members: methods, abstract methods and plain attributes.

use crate::class::marker::{Marker, Markers};
use crate::class::object::Object;
use crate::core::error::MethodResult;
use crate::core::signature::{BoundArguments, Signature};
use crate::core::types::Value;
use std::fmt;
use std::sync::Arc;

/// Body of a method or validator.
///
/// Receives the instance and the arguments already bound to the method's
/// signature.
pub type MethodFn = Arc<dyn Fn(&mut Object, &BoundArguments) -> MethodResult<Value> + Send + Sync>;

/// Anything validation markers can be attached to.
///
/// Marking never changes the calling contract; it only records intent for
/// the class builder.
pub trait Markable: Sized {
    /// Markers currently attached.
    fn markers(&self) -> Markers;

    /// Attach a marker. Idempotent.
    fn mark(self, marker: Marker) -> Self;

    /// Request a `validate_<name>` business-rule check before each call.
    fn prerun_validated(self) -> Self {
        self.mark(Marker::Prerun)
    }

    /// Request argument and return type checks on each call.
    fn type_validated(self) -> Self {
        self.mark(Marker::Type)
    }

    /// Request both prerun and type validation.
    fn validated(self) -> Self {
        self.prerun_validated().type_validated()
    }
}

/// A concrete method.
#[derive(Clone)]
pub struct Method {
    /// Method name
    pub name: String,
    /// Declared parameters and return type
    pub signature: Signature,
    /// Validation markers
    pub markers: Markers,
    body: MethodFn,
}

impl Method {
    /// Create an unmarked method.
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Object, &BoundArguments) -> MethodResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            markers: Markers::default(),
            body: Arc::new(body),
        }
    }

    /// Run the raw body, bypassing every check.
    pub fn invoke(&self, object: &mut Object, args: &BoundArguments) -> MethodResult<Value> {
        (self.body)(object, args)
    }
}

impl Markable for Method {
    fn markers(&self) -> Markers {
        self.markers
    }

    fn mark(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// A method every concrete subclass must override.
#[derive(Debug, Clone)]
pub struct AbstractMethod {
    /// Method name
    pub name: String,
    /// Signature overrides are expected to follow
    pub signature: Signature,
    /// Markers inherited by every override
    pub markers: Markers,
}

impl AbstractMethod {
    /// Declare an abstract method.
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            markers: Markers::default(),
        }
    }
}

impl Markable for AbstractMethod {
    fn markers(&self) -> Markers {
        self.markers
    }

    fn mark(mut self, marker: Marker) -> Self {
        self.markers.insert(marker);
        self
    }
}

/// A named entry in a class body.
#[derive(Debug, Clone)]
pub enum Member {
    /// Callable method
    Method(Method),
    /// Declared but unimplemented method
    Abstract(AbstractMethod),
    /// Non-callable class attribute
    Attribute(Value),
}

impl Member {
    /// Whether the member can be invoked.
    pub fn is_callable(&self) -> bool {
        matches!(self, Member::Method(_))
    }

    /// Markers declared on the member; attributes carry none.
    pub fn markers(&self) -> Markers {
        match self {
            Member::Method(method) => method.markers,
            Member::Abstract(method) => method.markers,
            Member::Attribute(_) => Markers::default(),
        }
    }

    /// The concrete method, if this member is one.
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Short description of the member's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Member::Method(_) => "method",
            Member::Abstract(_) => "abstract method",
            Member::Attribute(_) => "attribute",
        }
    }
}

/// Mark a method or abstract method for prerun validation.
pub fn prerun_validated<M: Markable>(member: M) -> M {
    member.prerun_validated()
}

/// Mark a method or abstract method for type validation.
pub fn type_validated<M: Markable>(member: M) -> M {
    member.type_validated()
}

/// Mark a method or abstract method for both kinds of validation.
pub fn validated<M: Markable>(member: M) -> M {
    member.validated()
}
