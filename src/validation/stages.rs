//! Individual structural check stages.
//!
//! Each stage checks one category of structural requirement on a built class.

use crate::class::marker::validator_name;
use crate::class::member::{Member, Method};
use crate::class::Class;
use crate::core::error::StructureError;
use crate::core::types::TypeSpec;

/// Trait for structural check stages.
pub trait StructureStage: Send + Sync {
    /// Name of this stage.
    fn name(&self) -> &str;

    /// Check the class.
    ///
    /// Returns every problem found, in a stable order.
    fn check(&self, class: &Class) -> Result<(), Vec<StructureError>>;
}

/// Resolve a name that must be a concrete method.
fn require_callable<'a>(class: &'a Class, name: &str) -> Result<&'a Method, StructureError> {
    match class.resolve(name).map(|r| &r.member) {
        Some(Member::Method(method)) => Ok(method),
        Some(Member::Attribute(_)) => Err(StructureError::NotCallable {
            class: class.name().to_string(),
            attribute: name.to_string(),
        }),
        Some(Member::Abstract(_)) | None => Err(StructureError::MissingMethod {
            class: class.name().to_string(),
            method: name.to_string(),
        }),
    }
}

fn into_result(errors: Vec<StructureError>) -> Result<(), Vec<StructureError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Required methods - checks every `require`d name.
///
/// Verifies:
/// - The name resolves to something
/// - That something is callable
pub struct RequiredMethods;

impl StructureStage for RequiredMethods {
    fn name(&self) -> &str {
        "Required Methods"
    }

    fn check(&self, class: &Class) -> Result<(), Vec<StructureError>> {
        let errors = class
            .required_methods()
            .iter()
            .filter_map(|name| require_callable(class, name).err())
            .collect();
        into_result(errors)
    }
}

/// Prerun validators - checks each prerun validated method's validator.
///
/// Verifies:
/// - The method itself is callable
/// - `validate_<name>` exists and is callable
/// - Under strict options, the validator declares the same parameters and
///   an explicit `None` return type
pub struct PrerunValidators;

impl PrerunValidators {
    fn check_one(&self, class: &Class, name: &str) -> Result<(), StructureError> {
        let method = require_callable(class, name)?;

        let validator = validator_name(name);
        let validator_method = match class.resolve(&validator).map(|r| &r.member) {
            Some(Member::Method(v)) => v,
            Some(Member::Attribute(_)) => {
                return Err(StructureError::NotCallable {
                    class: class.name().to_string(),
                    attribute: validator,
                })
            }
            Some(Member::Abstract(_)) | None => {
                return Err(StructureError::MissingValidator {
                    class: class.name().to_string(),
                    validator,
                    method: name.to_string(),
                })
            }
        };

        if class.options().strict_validators {
            if !validator_method.signature.same_parameters(&method.signature) {
                return Err(StructureError::SignatureMismatch {
                    validator,
                    method: name.to_string(),
                });
            }
            if validator_method.signature.returns != Some(TypeSpec::None) {
                let found = match &validator_method.signature.returns {
                    Some(spec) => spec.to_string(),
                    None => "no annotation".to_string(),
                };
                return Err(StructureError::ValidatorReturn { validator, found });
            }
        }

        Ok(())
    }
}

impl StructureStage for PrerunValidators {
    fn name(&self) -> &str {
        "Prerun Validators"
    }

    fn check(&self, class: &Class) -> Result<(), Vec<StructureError>> {
        let errors = class
            .prerun_methods()
            .iter()
            .filter_map(|name| self.check_one(class, name).err())
            .collect();
        into_result(errors)
    }
}

/// Type validated methods - checks each one resolves to a callable.
pub struct TypeValidatedMethods;

impl StructureStage for TypeValidatedMethods {
    fn name(&self) -> &str {
        "Type Validated Methods"
    }

    fn check(&self, class: &Class) -> Result<(), Vec<StructureError>> {
        let errors = class
            .type_methods()
            .iter()
            // Prerun names were already reported by the validator stage.
            .filter(|name| !class.prerun_methods().contains(*name))
            .filter_map(|name| require_callable(class, name).err())
            .collect();
        into_result(errors)
    }
}
