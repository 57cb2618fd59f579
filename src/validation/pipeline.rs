//! Structural check pipeline.

use crate::class::Class;
use crate::core::error::StructureError;
use crate::validation::stages::{
    PrerunValidators, RequiredMethods, StructureStage, TypeValidatedMethods,
};
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Multi-stage structural check.
///
/// Runs a series of stages over a built class. The default pipeline is what
/// a class runs on its first instantiation.
pub struct StructurePipeline {
    stages: Vec<Arc<dyn StructureStage>>,
}

impl StructurePipeline {
    /// Create a new pipeline with the given stages.
    pub fn new(stages: Vec<Arc<dyn StructureStage>>) -> Self {
        Self { stages }
    }

    /// Create the default pipeline with all standard stages.
    pub fn default_pipeline() -> Self {
        Self {
            stages: vec![
                Arc::new(RequiredMethods),
                Arc::new(PrerunValidators),
                Arc::new(TypeValidatedMethods),
            ],
        }
    }

    /// Add a custom stage.
    pub fn add_stage(&mut self, stage: Arc<dyn StructureStage>) {
        self.stages.push(stage);
    }

    /// Fail on the first structural problem.
    ///
    /// This is the self-check run before first instantiation.
    pub fn ensure(&self, class: &Class) -> Result<(), StructureError> {
        for stage in &self.stages {
            if let Err(errors) = stage.check(class) {
                if let Some(first) = errors.into_iter().next() {
                    return Err(first);
                }
            }
        }
        debug!("Methods of '{}' are ok", class.name());
        Ok(())
    }

    /// Run every stage and collect all problems.
    ///
    /// Unlike [`ensure`](Self::ensure) this never marks anything and emits no
    /// diagnostics, so it can be used to inspect classes up front.
    pub fn report(&self, class: &Class) -> StructureReport {
        let start = Instant::now();
        let mut report = StructureReport::new(class.name());

        if class.is_abstract() {
            report.abstract_methods = class.abstract_methods().to_vec();
        }

        for stage in &self.stages {
            if let Err(errors) = stage.check(class) {
                for error in errors {
                    report.add_error(stage.name(), error);
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }
}

impl Default for StructurePipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

/// Everything a structural check found wrong with a class.
#[derive(Debug, Clone, Serialize)]
pub struct StructureReport {
    /// Qualified class name
    pub class: String,
    /// Whether the class can be instantiated.
    pub success: bool,
    /// Abstract methods still lacking an override.
    pub abstract_methods: Vec<String>,
    /// `(stage, error)` pairs in the order found.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<(String, StructureError)>,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

fn serialize_errors<S>(errors: &[(String, StructureError)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(errors.len()))?;
    for (stage, error) in errors {
        seq.serialize_element(&(stage, error.to_string()))?;
    }
    seq.end()
}

impl StructureReport {
    /// Create a new empty report (success).
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            success: true,
            abstract_methods: Vec::new(),
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, stage: impl Into<String>, error: StructureError) {
        self.success = false;
        self.errors.push((stage.into(), error));
    }

    /// Check if the class can be instantiated.
    pub fn can_instantiate(&self) -> bool {
        self.success && self.abstract_methods.is_empty()
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.can_instantiate() {
            format!("✓ '{}' is structurally sound", self.class)
        } else if !self.abstract_methods.is_empty() && self.errors.is_empty() {
            format!(
                "✗ '{}' is abstract ({})",
                self.class,
                self.abstract_methods.join(", ")
            )
        } else {
            format!(
                "✗ '{}' failed with {} error(s)",
                self.class,
                self.errors.len()
            )
        }
    }

    /// Get numbered error messages tagged with their stage.
    pub fn detailed_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, (stage, error))| format!("{}. [{}] {}", i + 1, stage, error))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::member::{Markable, Method};
    use crate::class::ClassBuilder;
    use crate::core::signature::Signature;
    use crate::core::types::Value;

    fn broken_class() -> std::sync::Arc<Class> {
        ClassBuilder::new("m.Broken")
            .require("load")
            .method(Method::new("run", Signature::new(), |_, _| Ok(Value::None)).prerun_validated())
            .build()
            .unwrap()
    }

    #[test]
    fn test_ensure_returns_first_error() {
        let err = StructurePipeline::default().ensure(&broken_class()).unwrap_err();
        assert_eq!(
            err,
            StructureError::MissingMethod {
                class: "m.Broken".to_string(),
                method: "load".to_string(),
            }
        );
    }

    #[test]
    fn test_report_collects_everything() {
        let class = broken_class();
        let report = StructurePipeline::default().report(&class);

        assert!(!report.can_instantiate());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].0, "Required Methods");
        assert_eq!(report.errors[1].0, "Prerun Validators");
        assert!(report.detailed_errors()[1].contains("validate_run"));
        assert_eq!(report.summary(), "✗ 'm.Broken' failed with 2 error(s)");

        // Reporting does not count as the one-time self-check.
        assert!(!class.is_self_validated());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["class"], "m.Broken");
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_report_on_sound_class() {
        let class = ClassBuilder::new("m.Fine").build().unwrap();
        let report = StructurePipeline::default_pipeline().report(&class);
        assert!(report.can_instantiate());
        assert_eq!(report.summary(), "✓ 'm.Fine' is structurally sound");
    }
}
