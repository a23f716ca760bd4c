use super::{Failure, Scope};
use crate::context::{Conformance, Evaluation, TimedOut};
use crate::graph;
use crate::types::ConstraintComponent;

/// `sh:qualifiedValueShape` with `sh:qualifiedMinCount` / `sh:qualifiedMaxCount`.
///
/// Counts the values that conform to the qualified shape. When any value hits
/// the recursion limit the count is unknown and no failure is reported.
pub(crate) fn validate(
    scope: &Scope<'_>,
    eval: &mut Evaluation<'_, '_>,
    depth: usize,
) -> Result<Vec<Failure>, TimedOut> {
    let Scope::Property { shape, values, .. } = *scope else {
        return Ok(Vec::new());
    };
    let Some(qualified) = &shape.qualified else {
        return Ok(Vec::new());
    };
    if qualified.min_count.is_none() && qualified.max_count.is_none() {
        return Ok(Vec::new());
    }

    let mut count = 0u64;
    for value in values {
        match eval.conforms(value, &qualified.shape, depth)? {
            Conformance::Conforms => count += 1,
            Conformance::Fails => {}
            Conformance::Unknown => return Ok(Vec::new()),
        }
    }

    let mut failures = Vec::new();
    if let Some(min) = qualified.min_count {
        if count < min {
            failures.push(
                Failure::new(
                    ConstraintComponent::QualifiedMinCount,
                    None,
                    format!(
                        "{} value(s) conform to {}, fewer than the qualified minimum {}",
                        count,
                        graph::id_label(&qualified.shape),
                        min
                    ),
                )
                .with_shape(&qualified.shape),
            );
        }
    }
    if let Some(max) = qualified.max_count {
        if count > max {
            failures.push(
                Failure::new(
                    ConstraintComponent::QualifiedMaxCount,
                    None,
                    format!(
                        "{} value(s) conform to {}, more than the qualified maximum {}",
                        count,
                        graph::id_label(&qualified.shape),
                        max
                    ),
                )
                .with_shape(&qualified.shape),
            );
        }
    }
    Ok(failures)
}
