use super::{Failure, Scope};
use crate::types::ConstraintComponent;

/// `sh:minCount` and `sh:maxCount` over the values reached through the path.
pub(crate) fn validate(scope: &Scope<'_>) -> Vec<Failure> {
    let Scope::Property { shape, values, .. } = scope else {
        return Vec::new();
    };
    let count = values.len() as u64;
    let mut failures = Vec::new();

    if let Some(min_count) = shape.min_count {
        if count < min_count {
            failures.push(Failure::new(
                ConstraintComponent::MinCount,
                None,
                format!(
                    "Value count ({}) does not meet minimum requirement: {}",
                    count, min_count
                ),
            ));
        }
    }
    if let Some(max_count) = shape.max_count {
        if count > max_count {
            failures.push(Failure::new(
                ConstraintComponent::MaxCount,
                None,
                format!(
                    "Value count ({}) exceeds maximum requirement: {}",
                    count, max_count
                ),
            ));
        }
    }
    failures
}
