//! validating-base CLI
//!
//! A demonstration CLI over the built-in example classes.
//! Set `RUST_LOG=debug` to see the validation diagnostics.

use anyhow::{bail, Context};
use validating_base::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("validating-base");

    let Some(command) = args.get(1) else {
        print_usage(program);
        return Ok(());
    };

    let registry = ClassRegistry::with_builtins().context("building example classes")?;

    match command.as_str() {
        "list" => list_classes(&registry),
        "check" => {
            let Some(class) = args.get(2) else {
                bail!("Please specify a class name");
            };
            check_class(&registry, class)?;
        }
        "call" => {
            if args.len() < 4 {
                eprintln!("Usage: {} call <class> <method> [json-args]", program);
                bail!("Please specify a class and a method");
            }
            let json = args.get(4).map(String::as_str).unwrap_or("[]");
            call_method(&registry, &args[2], &args[3], json)?;
        }
        "help" | "--help" | "-h" => print_usage(program),
        other => {
            print_usage(program);
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!("validating-base v{}", validating_base::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                              List the example classes");
    println!("  check <class>                     Run the structural check on a class");
    println!("  call <class> <method> [json-args] Instantiate a class and call a method");
    println!("  help                              Show this help message");
    println!();
    println!("Class names may be given without the '{}.' prefix.", validating_base::catalog::builtin::MODULE);
    println!("Arguments are a JSON array of positional values, e.g. '[[1, 2, 3]]'.");
}

/// Accept both qualified and bare class names.
fn resolve_name(registry: &ClassRegistry, name: &str) -> String {
    if registry.contains(name) {
        return name.to_string();
    }
    format!("{}.{}", validating_base::catalog::builtin::MODULE, name)
}

fn list_classes(registry: &ClassRegistry) {
    println!("Example classes ({} total):", registry.len());
    println!();

    for class in registry.classes() {
        let kind = if class.is_abstract() { " (abstract)" } else { "" };
        println!("  • {}{}", class.name(), kind);

        let prerun: Vec<&str> = class.prerun_methods().iter().map(String::as_str).collect();
        let typed: Vec<&str> = class.type_methods().iter().map(String::as_str).collect();
        if !prerun.is_empty() {
            println!("      prerun validated: {}", prerun.join(", "));
        }
        if !typed.is_empty() {
            println!("      type validated:   {}", typed.join(", "));
        }
    }
}

fn check_class(registry: &ClassRegistry, name: &str) -> anyhow::Result<()> {
    let report = registry.report(&resolve_name(registry, name))?;

    println!("{}", report.summary());
    for line in report.detailed_errors() {
        println!("  {}", line);
    }

    if !report.can_instantiate() {
        bail!("'{}' cannot be instantiated", report.class);
    }
    Ok(())
}

fn call_method(registry: &ClassRegistry, class: &str, method: &str, json: &str) -> anyhow::Result<()> {
    let parsed: serde_json::Value =
        serde_json::from_str(json).with_context(|| format!("parsing arguments '{}'", json))?;
    let serde_json::Value::Array(items) = parsed else {
        bail!("Arguments must be a JSON array, got '{}'", json);
    };

    let arguments = items
        .into_iter()
        .fold(Arguments::new(), |args, item| args.arg(Value::from(item)));

    let mut object = registry.instantiate(&resolve_name(registry, class), Arguments::new())?;
    let result = object.call(method, arguments)?;

    println!("{}", result);
    Ok(())
}
