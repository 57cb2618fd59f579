//! Argument and return type checks against a signature's annotations.

use crate::core::error::CallError;
use crate::core::signature::{BoundArguments, Signature};
use crate::core::types::{CollectionCheck, Value};

/// Check every supplied argument against its parameter's annotation.
///
/// Defaults are never checked, and unannotated parameters accept anything.
/// The first mismatch is reported with the offending parameter and the
/// expected type.
pub fn check_arguments(
    qualname: &str,
    signature: &Signature,
    bound: &BoundArguments,
    strategy: CollectionCheck,
) -> Result<(), CallError> {
    for (name, value) in bound.supplied() {
        let Some(expected) = signature
            .get_parameter(name)
            .and_then(|p| p.annotation.as_ref())
        else {
            continue;
        };

        expected
            .check(value, strategy)
            .map_err(|detail| CallError::ArgumentType {
                method: qualname.to_string(),
                parameter: name.to_string(),
                expected: expected.clone(),
                detail,
            })?;
    }
    Ok(())
}

/// Check a produced value against the return annotation, if any.
pub fn check_return(
    qualname: &str,
    signature: &Signature,
    value: &Value,
    strategy: CollectionCheck,
) -> Result<(), CallError> {
    if let Some(expected) = &signature.returns {
        expected
            .check(value, strategy)
            .map_err(|detail| CallError::ReturnType {
                method: qualname.to_string(),
                expected: expected.clone(),
                detail,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature::{Arguments, Parameter};
    use crate::core::types::TypeSpec;

    fn signature() -> Signature {
        Signature::new()
            .param(Parameter::new("numbers", TypeSpec::list(TypeSpec::Integer)))
            .param(Parameter::untyped("anything"))
            .returning(TypeSpec::Integer)
    }

    #[test]
    fn test_argument_mismatch_names_parameter() {
        let sig = signature();
        let args = Arguments::new()
            .arg(vec![Value::from("1"), Value::Integer(2)])
            .arg(Value::None);
        let bound = sig.bind(&args).unwrap();

        let err = check_arguments("m.A.action", &sig, &bound, CollectionCheck::AllItems).unwrap_err();
        match err {
            CallError::ArgumentType {
                parameter,
                expected,
                ..
            } => {
                assert_eq!(parameter, "numbers");
                assert_eq!(expected, TypeSpec::list(TypeSpec::Integer));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unannotated_accepts_anything() {
        let sig = signature();
        let args = Arguments::new().arg(Vec::<Value>::new()).arg("whatever");
        let bound = sig.bind(&args).unwrap();
        assert!(check_arguments("m.A.action", &sig, &bound, CollectionCheck::AllItems).is_ok());
    }

    #[test]
    fn test_defaults_are_not_checked() {
        let sig = Signature::new()
            .param(Parameter::new("x", TypeSpec::Integer).with_default(Value::None));

        let bound = sig.bind(&Arguments::new()).unwrap();
        assert!(check_arguments("m.A.f", &sig, &bound, CollectionCheck::AllItems).is_ok());

        let bound = sig.bind(&Arguments::new().kwarg("x", Value::None)).unwrap();
        let err = check_arguments("m.A.f", &sig, &bound, CollectionCheck::AllItems).unwrap_err();
        assert!(matches!(err, CallError::ArgumentType { ref parameter, .. } if parameter == "x"));
    }

    #[test]
    fn test_return_check() {
        let sig = signature();
        assert!(check_return("m.A.action", &sig, &Value::Integer(3), CollectionCheck::AllItems).is_ok());

        let err = check_return("m.A.action", &sig, &Value::Float(3.0), CollectionCheck::AllItems).unwrap_err();
        assert!(matches!(err, CallError::ReturnType { ref expected, .. } if *expected == TypeSpec::Integer));

        // No annotation, no check.
        let bare = Signature::new();
        assert!(check_return("m.A.f", &bare, &Value::Float(3.0), CollectionCheck::AllItems).is_ok());
    }
}
