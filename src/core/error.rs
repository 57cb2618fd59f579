//! Error types for validating-base.
//!
//! Uses thiserror for structured errors. Each phase has its own enum:
//! - [`DefinitionError`] when a class is built
//! - [`StructureError`] from the one-time structural self-check
//! - [`InstantiateError`] when an instance is constructed
//! - [`CallError`] when a method is invoked through an instance
//!
//! [`MethodError`] is what method bodies and validators themselves raise; it
//! passes through the engine untouched.

use crate::core::types::TypeSpec;
use thiserror::Error;

/// Top-level error type.
///
/// Encompasses all error categories and enables automatic conversion
/// between specific error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Instantiation error: {0}")]
    Instantiate(#[from] InstantiateError),

    #[error("Call error: {0}")]
    Call(#[from] CallError),

    #[error("Options error: {0}")]
    Options(#[from] OptionsError),

    #[error("Class not registered: {0}")]
    UnknownClass(String),
}

/// Errors raised while a class is being built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// The legacy list-based declaration style is no longer accepted.
    #[error(
        "'{class}' sets the deprecated '{attribute}' attribute; mark methods with \
         `validated`/`prerun_validated`/`type_validated` and declare required \
         methods with `abstract_method` or `require` instead"
    )]
    Deprecated { class: String, attribute: String },

    #[error("'{class}' lists base '{base}' more than once")]
    DuplicateBase { class: String, base: String },

    #[error("Cannot create a consistent method resolution order for '{class}'")]
    InconsistentHierarchy { class: String },

    #[error("'{class}' defines member '{member}' more than once")]
    DuplicateMember { class: String, member: String },
}

/// Errors from the structural self-check run before first instantiation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("The {method} method must be defined on '{class}'")]
    MissingMethod { class: String, method: String },

    #[error("The {validator} method must be defined on '{class}' for the {method} method")]
    MissingValidator {
        class: String,
        validator: String,
        method: String,
    },

    #[error("The {attribute} attribute of '{class}' must be a callable")]
    NotCallable { class: String, attribute: String },

    #[error("The {validator} method must have the same argument signature as the {method} method")]
    SignatureMismatch { validator: String, method: String },

    #[error("The {validator} method must have a return type of None, found {found}")]
    ValidatorReturn { validator: String, found: String },
}

/// Errors raised when constructing an instance.
#[derive(Error, Debug)]
pub enum InstantiateError {
    /// Abstract methods remain without an override.
    #[error("Can't instantiate abstract class '{class}' with abstract methods {}", .methods.join(", "))]
    Abstract { class: String, methods: Vec<String> },

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("Invalid arguments for '{class}' initializer: {source}")]
    Bind {
        class: String,
        #[source]
        source: BindError,
    },

    /// The initializer body itself failed.
    #[error(transparent)]
    Init(#[from] MethodError),
}

/// Errors raised when calling a method on an instance.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("'{class}' has no method '{method}'")]
    UnknownMethod { class: String, method: String },

    #[error("The {attribute} attribute of '{class}' is not callable")]
    NotCallable { class: String, attribute: String },

    #[error("Invalid arguments for '{method}': {source}")]
    Bind {
        method: String,
        #[source]
        source: BindError,
    },

    #[error("argument \"{parameter}\" of '{method}' is not {expected}: {detail}")]
    ArgumentType {
        method: String,
        parameter: String,
        expected: TypeSpec,
        detail: String,
    },

    #[error("the return value of '{method}' is not {expected}: {detail}")]
    ReturnType {
        method: String,
        expected: TypeSpec,
        detail: String,
    },

    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Raised by a validator or the method body, passed through unchanged.
    #[error(transparent)]
    Raised(#[from] MethodError),
}

/// Errors raised by method bodies and validators.
///
/// The variants mirror the broad failure kinds a business rule reports.
#[derive(Error, Debug)]
pub enum MethodError {
    /// A value has the wrong type for the rule.
    #[error("{0}")]
    Type(String),

    /// A value has the right type but an unacceptable content.
    #[error("{0}")]
    Value(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors binding call arguments to a signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("takes {expected} positional arguments but {got} were given")]
    TooManyPositional { expected: usize, got: usize },

    #[error("got an unexpected keyword argument '{0}'")]
    UnexpectedKeyword(String),

    #[error("got multiple values for argument '{0}'")]
    MultipleValues(String),

    #[error("missing a required argument: '{0}'")]
    MissingArgument(String),
}

/// Errors loading validation options.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl StructureError {
    /// Whether a required method or validator is absent.
    pub fn is_missing_implementation(&self) -> bool {
        matches!(
            self,
            StructureError::MissingMethod { .. } | StructureError::MissingValidator { .. }
        )
    }

    /// Whether a member exists but has the wrong shape or contract.
    pub fn is_type_error(&self) -> bool {
        !self.is_missing_implementation()
    }
}

impl InstantiateError {
    /// Whether construction failed because behavior is missing.
    ///
    /// True both for remaining abstract methods and for missing methods or
    /// validators found by the self-check.
    pub fn is_missing_implementation(&self) -> bool {
        match self {
            InstantiateError::Abstract { .. } => true,
            InstantiateError::Structure(err) => err.is_missing_implementation(),
            InstantiateError::Init(MethodError::NotImplemented(_)) => true,
            _ => false,
        }
    }

    /// The structural error, if the self-check failed.
    pub fn structure(&self) -> Option<&StructureError> {
        match self {
            InstantiateError::Structure(err) => Some(err),
            _ => None,
        }
    }
}

impl CallError {
    /// Whether this is a type-like failure.
    ///
    /// Covers argument and return annotation mismatches, arguments that do not
    /// bind, non-callable members, and type failures raised by a validator.
    pub fn is_type_error(&self) -> bool {
        match self {
            CallError::ArgumentType { .. }
            | CallError::ReturnType { .. }
            | CallError::Bind { .. }
            | CallError::NotCallable { .. } => true,
            CallError::Structure(err) => err.is_type_error(),
            CallError::Raised(MethodError::Type(_)) => true,
            _ => false,
        }
    }

    /// The error raised by a validator or body, if that is what failed.
    pub fn raised(&self) -> Option<&MethodError> {
        match self {
            CallError::Raised(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for top-level operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for method bodies and validators.
pub type MethodResult<T> = Result<T, MethodError>;

/// Result type alias for calls through an instance.
pub type CallResult<T> = Result<T, CallError>;
