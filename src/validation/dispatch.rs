//! Call interception.
//!
//! A [`ValidatedMethod`] is built by the class builder for every prerun or
//! type validated method. It owns the original method and, for prerun
//! validation, the validator resolved once at build time.
//!
//! Every call goes through these checkpoints, in this order, stopping at the
//! first failure:
//! 1. `validate_<name>` with the caller's arguments (its error is returned as is)
//! 2. argument types against the method's parameter annotations
//! 3. the method body
//! 4. the result against the return annotation

use crate::class::member::Method;
use crate::class::object::Object;
use crate::class::marker::validator_name;
use crate::core::error::{CallError, CallResult, StructureError};
use crate::core::signature::Arguments;
use crate::core::types::{CollectionCheck, Value};
use crate::validation::typecheck::{check_arguments, check_return};
use log::{debug, trace};

/// A validator bound to the method it guards.
#[derive(Debug, Clone)]
pub struct Validator {
    /// `<defining class>.validate_<name>`
    pub(crate) qualname: String,
    pub(crate) method: Method,
}

/// Validating proxy around a marked method.
#[derive(Debug, Clone)]
pub struct ValidatedMethod {
    pub(crate) class: String,
    pub(crate) qualname: String,
    pub(crate) method: Method,
    pub(crate) prerun: bool,
    pub(crate) validator: Option<Validator>,
    pub(crate) typed: bool,
    pub(crate) collection_check: CollectionCheck,
}

impl ValidatedMethod {
    /// `<class>.<method>` as seen from the instance's class.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Qualified name of the bound validator, if any.
    pub fn validator_qualname(&self) -> Option<&str> {
        self.validator.as_ref().map(|v| v.qualname.as_str())
    }

    /// The wrapped method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Whether a business-rule validator runs first.
    pub fn is_prerun_validated(&self) -> bool {
        self.prerun
    }

    /// Whether arguments and result are type checked.
    pub fn is_type_validated(&self) -> bool {
        self.typed
    }

    /// Invoke the method with validation.
    pub fn call(&self, object: &mut Object, args: &Arguments) -> CallResult<Value> {
        trace!("Calling '{}' through its validating proxy", self.qualname);

        if self.prerun {
            let validator = self.validator.as_ref().ok_or_else(|| StructureError::MissingValidator {
                class: self.class.clone(),
                validator: validator_name(&self.method.name),
                method: self.method.name.clone(),
            })?;

            let bound = validator
                .method
                .signature
                .bind(args)
                .map_err(|source| CallError::Bind {
                    method: validator.qualname.clone(),
                    source,
                })?;
            validator.method.invoke(object, &bound)?;
            debug!(
                "Inputs for '{}' are ok (validated using '{}')",
                self.qualname, validator.qualname
            );
        }

        let bound = self
            .method
            .signature
            .bind(args)
            .map_err(|source| CallError::Bind {
                method: self.qualname.clone(),
                source,
            })?;

        if self.typed {
            check_arguments(&self.qualname, &self.method.signature, &bound, self.collection_check)?;
            debug!("Argument types for '{}' are ok", self.qualname);
        }

        let result = self.method.invoke(object, &bound)?;

        if self.typed {
            check_return(&self.qualname, &self.method.signature, &result, self.collection_check)?;
            debug!("Return type of '{}' is ok", self.qualname);
        }

        Ok(result)
    }
}
