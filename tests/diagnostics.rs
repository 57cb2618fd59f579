//! Debug diagnostics emitted by the engine.
//!
//! A single test owns the global logger for this binary.

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::sync::Arc;
use validating_base::prelude::*;

struct CapturingLogger {
    records: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() == Level::Debug && metadata.target().starts_with("validating_base")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records.lock().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

fn take_records() -> Vec<String> {
    std::mem::take(&mut *LOGGER.records.lock())
}

fn number_list() -> Signature {
    Signature::new().param(Parameter::new("number_list", TypeSpec::list(TypeSpec::Integer)))
}

fn action_example() -> Arc<Class> {
    ClassBuilder::new("tests.ActionExample")
        .abstract_method(
            AbstractMethod::new("action", number_list().returning(TypeSpec::Integer)).validated(),
        )
        .method(Method::new(
            "validate_action",
            number_list().returning(TypeSpec::None),
            |_, args| {
                for n in args.get_list("number_list").unwrap_or_default() {
                    if n.as_integer().is_none() {
                        return Err(MethodError::Type(format!("{} is not an integer", n)));
                    }
                }
                Ok(Value::None)
            },
        ))
        .build()
        .unwrap()
}

fn adder_example(base: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("tests.AdderExample")
        .extends(base)
        .method(Method::new(
            "action",
            number_list().returning(TypeSpec::Integer),
            |_, args| {
                let total: i64 = args
                    .get_list("number_list")
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Value::as_integer)
                    .sum();
                Ok(Value::Integer(total))
            },
        ))
        .build()
        .unwrap()
}

#[test]
fn test_diagnostic_sequence() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Debug);

    let base = action_example();
    let adder = adder_example(&base);

    let mut obj = adder.instantiate(Arguments::new()).unwrap();
    let result = obj
        .call("action", Arguments::new().arg(vec![1i64, 2, 3, 4, 5]))
        .unwrap();
    assert_eq!(result, Value::Integer(15));

    assert_eq!(
        take_records(),
        vec![
            "Methods of 'tests.AdderExample' are ok".to_string(),
            "Inputs for 'tests.AdderExample.action' are ok (validated using 'tests.ActionExample.validate_action')"
                .to_string(),
            "Argument types for 'tests.AdderExample.action' are ok".to_string(),
            "Return type of 'tests.AdderExample.action' is ok".to_string(),
        ]
    );

    // The structural check does not run again for the second instance.
    let _second = adder.instantiate(Arguments::new()).unwrap();
    assert!(take_records().is_empty());

    // A rejected call stops at the validator.
    let args = Arguments::new().arg(Value::List(vec![Value::from("1"), Value::Integer(2)]));
    let err = obj.call("action", args).unwrap_err();
    assert!(err.is_type_error());
    assert!(take_records().is_empty());

    // Reporting never counts as the self-check and logs nothing.
    let other = adder_example(&base);
    let report = StructurePipeline::default().report(&other);
    assert!(report.can_instantiate());
    assert!(!other.is_self_validated());
    assert!(take_records().is_empty());
}
