use super::{describe, Failure, Scope};
use crate::types::ConstraintComponent;
use oxigraph::model::Term;

/// `sh:pattern`, `sh:minLength`, `sh:maxLength` and `sh:languageIn`.
pub(crate) fn validate(scope: &Scope<'_>) -> Vec<Failure> {
    let constraints = scope.constraints();
    let mut failures = Vec::new();

    for value in scope.value_nodes() {
        if let Some(pattern) = &constraints.pattern {
            let matched = match value {
                Term::Literal(lit) => pattern.is_match(lit.value()),
                _ => false,
            };
            if !matched {
                failures.push(Failure::new(
                    ConstraintComponent::Pattern,
                    Some(value),
                    format!(
                        "Value {} does not match pattern '{}'",
                        describe(value),
                        pattern.source()
                    ),
                ));
            }
        }

        let length = lexical_length(value);
        if let Some(min_length) = constraints.min_length {
            if !matches!(length, Some(len) if len >= min_length) {
                failures.push(Failure::new(
                    ConstraintComponent::MinLength,
                    Some(value),
                    format!(
                        "Value {} is shorter than the minimum length {}",
                        describe(value),
                        min_length
                    ),
                ));
            }
        }
        if let Some(max_length) = constraints.max_length {
            if !matches!(length, Some(len) if len <= max_length) {
                failures.push(Failure::new(
                    ConstraintComponent::MaxLength,
                    Some(value),
                    format!(
                        "Value {} is longer than the maximum length {}",
                        describe(value),
                        max_length
                    ),
                ));
            }
        }

        if let Some(ranges) = &constraints.language_in {
            let tag = match value {
                Term::Literal(lit) => lit.language(),
                _ => None,
            };
            let allowed = tag.is_some_and(|tag| ranges.iter().any(|range| lang_matches(tag, range)));
            if !allowed {
                failures.push(Failure::new(
                    ConstraintComponent::LanguageIn,
                    Some(value),
                    format!(
                        "Value {} does not carry one of the language tags [{}]",
                        describe(value),
                        ranges.join(", ")
                    ),
                ));
            }
        }
    }
    failures
}

/// Character count of a literal's lexical form or an IRI's text. Blank
/// nodes have no string form.
fn lexical_length(term: &Term) -> Option<u64> {
    match term {
        Term::Literal(lit) => Some(lit.value().chars().count() as u64),
        Term::NamedNode(nn) => Some(nn.as_str().chars().count() as u64),
        _ => None,
    }
}

/// Basic language-range matching: `en` matches `en` and `en-GB`, `*` matches
/// any tag. Case-insensitive.
fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    let tag = tag.to_ascii_lowercase();
    let range = range.to_ascii_lowercase();
    tag == range
        || (tag.len() > range.len() && tag.starts_with(&range) && tag.as_bytes()[range.len()] == b'-')
}
