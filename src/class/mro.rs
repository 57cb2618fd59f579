//! Method resolution order.
//!
//! C3 linearization, so that with multiple inheritance every ancestor appears
//! exactly once, after all of its subclasses, and in the order bases were
//! listed.

use crate::class::Class;
use crate::core::error::DefinitionError;
use std::sync::Arc;

/// Linearize the ancestors of a class being defined with `bases`.
///
/// The class itself is not part of the result.
pub(crate) fn linearize(
    class_name: &str,
    bases: &[Arc<Class>],
) -> Result<Vec<Arc<Class>>, DefinitionError> {
    let mut sequences: Vec<Vec<Arc<Class>>> = bases
        .iter()
        .map(|base| {
            let mut sequence = Vec::with_capacity(base.mro().len() + 1);
            sequence.push(Arc::clone(base));
            sequence.extend(base.mro().iter().cloned());
            sequence
        })
        .collect();
    sequences.push(bases.to_vec());

    let mut result: Vec<Arc<Class>> = Vec::new();
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        // A good head appears in no sequence's tail.
        let next = sequences
            .iter()
            .map(|sequence| &sequence[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|sequence| sequence[1..].iter().any(|c| Arc::ptr_eq(c, head)))
            })
            .cloned();

        let Some(next) = next else {
            return Err(DefinitionError::InconsistentHierarchy {
                class: class_name.to_string(),
            });
        };

        for sequence in sequences.iter_mut() {
            if Arc::ptr_eq(&sequence[0], &next) {
                sequence.remove(0);
            }
        }
        result.push(next);
    }
}

#[cfg(test)]
mod tests {
    use crate::class::ClassBuilder;
    use crate::core::error::DefinitionError;

    fn names(class: &crate::class::Class) -> Vec<&str> {
        class.mro().iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_single_inheritance_chain() {
        let a = ClassBuilder::new("A").build().unwrap();
        let b = ClassBuilder::new("B").extends(&a).build().unwrap();
        let c = ClassBuilder::new("C").extends(&b).build().unwrap();
        assert_eq!(names(&c), ["B", "A"]);
    }

    #[test]
    fn test_diamond() {
        let o = ClassBuilder::new("O").build().unwrap();
        let a = ClassBuilder::new("A").extends(&o).build().unwrap();
        let b = ClassBuilder::new("B").extends(&o).build().unwrap();
        let d = ClassBuilder::new("D").extends(&a).extends(&b).build().unwrap();
        assert_eq!(names(&d), ["A", "B", "O"]);
    }

    #[test]
    fn test_inconsistent_order_is_rejected() {
        let o = ClassBuilder::new("O").build().unwrap();
        let a = ClassBuilder::new("A").extends(&o).build().unwrap();
        // O before A contradicts A's own order.
        let err = ClassBuilder::new("X").extends(&o).extends(&a).build().unwrap_err();
        assert_eq!(
            err,
            DefinitionError::InconsistentHierarchy {
                class: "X".to_string()
            }
        );
    }
}
