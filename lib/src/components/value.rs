use super::value_type::{is_decimal_lexical, is_integer_lexical};
use super::{describe, Failure, Scope};
use crate::types::ConstraintComponent;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Literal, NamedNodeRef, Term};
use oxsdatatypes::{Decimal, Double, Float};
use std::cmp::Ordering;
use std::str::FromStr;

/// `sh:in`, `sh:hasValue` and the four numeric bounds.
pub(crate) fn validate(scope: &Scope<'_>) -> Vec<Failure> {
    let constraints = scope.constraints();
    let mut failures = Vec::new();

    if let Some(required) = &constraints.has_value {
        let present = scope.value_nodes().iter().any(|v| v == required);
        if !present {
            let message = if scope.is_property() {
                format!("Missing required value {}", describe(required))
            } else {
                format!(
                    "Node {} is not the required value {}",
                    describe(scope.focus()),
                    describe(required)
                )
            };
            failures.push(Failure::new(
                ConstraintComponent::HasValue,
                Some(required),
                message,
            ));
        }
    }

    let bounds = [
        (ConstraintComponent::MinInclusive, &constraints.min_inclusive),
        (ConstraintComponent::MinExclusive, &constraints.min_exclusive),
        (ConstraintComponent::MaxInclusive, &constraints.max_inclusive),
        (ConstraintComponent::MaxExclusive, &constraints.max_exclusive),
    ];

    for value in scope.value_nodes() {
        if let Some(allowed) = &constraints.in_values {
            if !allowed.contains(value) {
                failures.push(Failure::new(
                    ConstraintComponent::In,
                    Some(value),
                    format!(
                        "Value {} is not one of the {} allowed value(s)",
                        describe(value),
                        allowed.len()
                    ),
                ));
            }
        }

        for (component, bound) in &bounds {
            let Some(bound) = bound else {
                continue;
            };
            let ordering = match value {
                Term::Literal(lit) => compare_numeric(lit, bound),
                _ => None,
            };
            let satisfied = match (component, ordering) {
                (_, None) => false,
                (ConstraintComponent::MinInclusive, Some(o)) => o != Ordering::Less,
                (ConstraintComponent::MinExclusive, Some(o)) => o == Ordering::Greater,
                (ConstraintComponent::MaxInclusive, Some(o)) => o != Ordering::Greater,
                (ConstraintComponent::MaxExclusive, Some(o)) => o == Ordering::Less,
                _ => true,
            };
            if !satisfied {
                let relation = match component {
                    ConstraintComponent::MinInclusive => ">=",
                    ConstraintComponent::MinExclusive => ">",
                    ConstraintComponent::MaxInclusive => "<=",
                    _ => "<",
                };
                failures.push(Failure::new(
                    *component,
                    Some(value),
                    format!(
                        "Value {} is not a number {} {}",
                        describe(value),
                        relation,
                        bound.value()
                    ),
                ));
            }
        }
    }
    failures
}

#[derive(Debug, Clone)]
enum Number {
    Exact(Decimal),
    /// An integer outside the range of [`Decimal`], kept as sign and digits.
    Big { negative: bool, digits: String },
    Approximate(f64),
}

impl Number {
    fn parse(lit: &Literal) -> Option<Number> {
        let datatype = lit.datatype();
        let value = lit.value().trim();
        if is_exact(datatype) {
            if let Ok(d) = Decimal::from_str(value) {
                return Some(Number::Exact(d));
            }
            if is_integer_lexical(value) {
                let negative = value.starts_with('-');
                let unsigned = value.trim_start_matches(['+', '-']).trim_start_matches('0');
                return Some(Number::Big {
                    negative,
                    digits: unsigned.to_string(),
                });
            }
            if is_decimal_lexical(value) {
                return value.parse().ok().map(Number::Approximate);
            }
            None
        } else if datatype == xsd::DOUBLE {
            Double::from_str(value).ok().map(|d| Number::Approximate(d.into()))
        } else if datatype == xsd::FLOAT {
            Float::from_str(value)
                .ok()
                .map(|f| Number::Approximate(f32::from(f).into()))
        } else {
            None
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Exact(d) => d.to_string().parse().ok(),
            Number::Big { negative, digits } => {
                let magnitude: f64 = digits.parse().ok()?;
                Some(if *negative { -magnitude } else { magnitude })
            }
            Number::Approximate(f) => Some(*f),
        }
    }
}

/// Integers and decimals compare exactly.
fn is_exact(datatype: NamedNodeRef<'_>) -> bool {
    [
        xsd::DECIMAL,
        xsd::INTEGER,
        xsd::LONG,
        xsd::INT,
        xsd::SHORT,
        xsd::BYTE,
        xsd::NON_NEGATIVE_INTEGER,
        xsd::POSITIVE_INTEGER,
        xsd::NON_POSITIVE_INTEGER,
        xsd::NEGATIVE_INTEGER,
        xsd::UNSIGNED_LONG,
        xsd::UNSIGNED_INT,
        xsd::UNSIGNED_SHORT,
        xsd::UNSIGNED_BYTE,
    ]
    .contains(&datatype)
}

/// Orders `value` against `bound` when both are numeric literals.
///
/// Returns `None` for non-numeric or ill-formed literals and for NaN.
pub(crate) fn compare_numeric(value: &Literal, bound: &Literal) -> Option<Ordering> {
    match (Number::parse(value)?, Number::parse(bound)?) {
        (Number::Exact(a), Number::Exact(b)) => a.partial_cmp(&b),
        (Number::Big { negative, digits }, Number::Big { negative: other_negative, digits: other_digits }) => {
            let magnitude = digits.len().cmp(&other_digits.len()).then_with(|| digits.cmp(&other_digits));
            Some(match (negative, other_negative) {
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (false, false) => magnitude,
                (true, true) => magnitude.reverse(),
            })
        }
        // a big integer lies beyond every decimal, on the side of its sign
        (Number::Big { negative, .. }, Number::Exact(_)) => Some(if negative {
            Ordering::Less
        } else {
            Ordering::Greater
        }),
        (Number::Exact(_), Number::Big { negative, .. }) => Some(if negative {
            Ordering::Greater
        } else {
            Ordering::Less
        }),
        (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{NodeShape, PropertyShape};
    use oxigraph::model::{BlankNode, NamedNode, NamedOrBlankNode};

    fn int(n: i64) -> Literal {
        Literal::new_typed_literal(n.to_string(), xsd::INTEGER)
    }

    fn node_shape() -> NodeShape {
        NodeShape::new(NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(
            "http://example.org/S",
        )))
    }

    fn run(shape: &NodeShape, focus: &Term) -> Vec<Failure> {
        validate(&Scope::Node { shape, focus })
    }

    #[test]
    fn numeric_comparison_mixes_types() {
        let dec = Literal::new_typed_literal("2.5", xsd::DECIMAL);
        let dbl = Literal::new_typed_literal("2.5E0", xsd::DOUBLE);
        assert_eq!(compare_numeric(&int(3), &dec), Some(Ordering::Greater));
        assert_eq!(compare_numeric(&dec, &dbl), Some(Ordering::Equal));
        assert_eq!(compare_numeric(&Literal::new_simple_literal("3"), &int(3)), None);
        let nan = Literal::new_typed_literal("NaN", xsd::DOUBLE);
        assert_eq!(compare_numeric(&nan, &int(1)), None);
    }

    #[test]
    fn integers_beyond_decimal_range_still_compare() {
        let huge = Literal::new_typed_literal("100000000000000000000000", xsd::INTEGER);
        let huger = Literal::new_typed_literal("1000000000000000000000000000000000000000000", xsd::INTEGER);
        let negative = Literal::new_typed_literal("-100000000000000000000000", xsd::INTEGER);
        assert_eq!(compare_numeric(&huge, &int(0)), Some(Ordering::Greater));
        assert_eq!(compare_numeric(&negative, &int(0)), Some(Ordering::Less));
        assert_eq!(compare_numeric(&int(0), &huge), Some(Ordering::Less));
        assert_eq!(compare_numeric(&huge, &huger), Some(Ordering::Less));
        assert_eq!(compare_numeric(&negative, &huge), Some(Ordering::Less));
        assert_eq!(compare_numeric(&huge, &huge), Some(Ordering::Equal));
        let padded = Literal::new_typed_literal("+000100000000000000000000000", xsd::INTEGER);
        assert_eq!(compare_numeric(&padded, &huge), Some(Ordering::Equal));
        let dbl = Literal::new_typed_literal("1.0E30", xsd::DOUBLE);
        assert_eq!(compare_numeric(&huge, &dbl), Some(Ordering::Less));

        let mut s = node_shape();
        s.constraints.min_inclusive = Some(int(0));
        assert!(run(&s, &Term::Literal(huge)).is_empty());
        assert_eq!(run(&s, &Term::Literal(negative)).len(), 1);
    }

    #[test]
    fn bounds_are_inclusive_or_exclusive() {
        let mut s = node_shape();
        s.constraints.min_inclusive = Some(int(1));
        s.constraints.max_exclusive = Some(int(10));
        assert!(run(&s, &Term::Literal(int(1))).is_empty());
        assert!(run(&s, &Term::Literal(int(9))).is_empty());
        let failures = run(&s, &Term::Literal(int(10)));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].component, ConstraintComponent::MaxExclusive);
        // non-numeric values break every bound that is set
        assert_eq!(run(&s, &Term::Literal(Literal::new_simple_literal("5"))).len(), 2);
    }

    #[test]
    fn in_requires_membership() {
        let mut s = node_shape();
        let a = Term::NamedNode(NamedNode::new_unchecked("http://example.org/a"));
        let b = Term::NamedNode(NamedNode::new_unchecked("http://example.org/b"));
        s.constraints.in_values = Some(vec![a.clone()]);
        assert!(run(&s, &a).is_empty());
        assert_eq!(run(&s, &b)[0].component, ConstraintComponent::In);
    }

    #[test]
    fn has_value_at_property_level_needs_one_match() {
        let mut prop = PropertyShape::new(
            BlankNode::default().into(),
            NamedNode::new_unchecked("http://example.org/p"),
        );
        prop.constraints.has_value = Some(Term::Literal(int(1)));
        let focus = Term::NamedNode(NamedNode::new_unchecked("http://example.org/a"));
        let values = vec![Term::Literal(int(2)), Term::Literal(int(1))];
        let scope = Scope::Property {
            shape: &prop,
            focus: &focus,
            values: &values,
        };
        assert!(validate(&scope).is_empty());
        let scope = Scope::Property {
            shape: &prop,
            focus: &focus,
            values: &values[..1],
        };
        assert_eq!(validate(&scope).len(), 1);
    }
}
