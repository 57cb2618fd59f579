//! Built-in example classes.
//!
//! `ActionExample` declares an abstract, fully validated `action` together
//! with its business rule. Subclasses only supply the body.

use crate::catalog::registry::ClassRegistry;
use crate::class::{AbstractMethod, Class, ClassBuilder, Markable, Method};
use crate::core::error::{DefinitionError, MethodError, MethodResult};
use crate::core::signature::{BoundArguments, Parameter, Signature};
use crate::core::types::{TypeSpec, Value};
use std::sync::Arc;

/// Module prefix of every built-in class name.
pub const MODULE: &str = "validating_base.examples";

fn qualified(name: &str) -> String {
    format!("{}.{}", MODULE, name)
}

fn action_signature() -> Signature {
    Signature::new().param(Parameter::new("number_list", TypeSpec::list(TypeSpec::Integer)))
}

fn numbers(args: &BoundArguments) -> MethodResult<&[Value]> {
    args.get_list("number_list")
        .ok_or_else(|| MethodError::Type("number_list must be a list".to_string()))
}

/// Every element of `number_list` must be an integer.
fn validate_action(args: &BoundArguments) -> MethodResult<Value> {
    for number in numbers(args)? {
        if !matches!(number, Value::Integer(_)) {
            return Err(MethodError::Type(format!("{} is not an integer", number)));
        }
    }
    Ok(Value::None)
}

/// Fold the integers of `number_list`, failing on overflow.
fn fold_numbers(
    args: &BoundArguments,
    start: i64,
    op: fn(i64, i64) -> Option<i64>,
) -> MethodResult<Value> {
    let mut total = start;
    for number in numbers(args)? {
        let n = number
            .as_integer()
            .ok_or_else(|| MethodError::Type(format!("{} is not an integer", number)))?;
        total = op(total, n).ok_or_else(|| MethodError::Value("integer overflow".to_string()))?;
    }
    Ok(Value::Integer(total))
}

/// Abstract base requiring a validated `action`.
pub fn action_example() -> Result<Arc<Class>, DefinitionError> {
    ClassBuilder::new(qualified("ActionExample"))
        .abstract_method(
            AbstractMethod::new("action", action_signature().returning(TypeSpec::Integer)).validated(),
        )
        .method(Method::new(
            "validate_action",
            action_signature().returning(TypeSpec::None),
            |_, args| validate_action(args),
        ))
        .build()
}

/// Sums the list.
pub fn adder_example(base: &Arc<Class>) -> Result<Arc<Class>, DefinitionError> {
    ClassBuilder::new(qualified("AdderExample"))
        .extends(base)
        .method(Method::new(
            "action",
            action_signature().returning(TypeSpec::Integer),
            |_, args| fold_numbers(args, 0, i64::checked_add),
        ))
        .build()
}

/// Multiplies the list.
pub fn multiplier_example(base: &Arc<Class>) -> Result<Arc<Class>, DefinitionError> {
    ClassBuilder::new(qualified("MultiplierExample"))
        .extends(base)
        .method(Method::new(
            "action",
            action_signature().returning(TypeSpec::Integer),
            |_, args| fold_numbers(args, 1, i64::checked_mul),
        ))
        .build()
}

/// Never overrides `action`, so it cannot be instantiated.
pub fn invalid_example(base: &Arc<Class>) -> Result<Arc<Class>, DefinitionError> {
    ClassBuilder::new(qualified("InvalidExample")).extends(base).build()
}

/// Marks `action` for prerun validation but never defines `validate_action`.
pub fn unvalidated_example() -> Result<Arc<Class>, DefinitionError> {
    ClassBuilder::new(qualified("UnvalidatedExample"))
        .method(
            Method::new(
                "action",
                action_signature().returning(TypeSpec::Integer),
                |_, args| fold_numbers(args, 0, i64::checked_add),
            )
            .validated(),
        )
        .build()
}

/// Register all built-in classes.
pub fn register_all(registry: &mut ClassRegistry) -> Result<(), DefinitionError> {
    let base = action_example()?;
    registry.register(adder_example(&base)?);
    registry.register(multiplier_example(&base)?);
    registry.register(invalid_example(&base)?);
    registry.register(unvalidated_example()?);
    registry.register(base);
    Ok(())
}
