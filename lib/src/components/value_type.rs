use super::{describe, Failure, Scope};
use crate::graph;
use crate::types::ConstraintComponent;
use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{Graph, Literal, NamedNodeRef, Term};
use oxsdatatypes::{Boolean, Date, DateTime, Double, Float, Time};
use std::str::FromStr;

/// `sh:datatype`, `sh:class` and `sh:nodeKind`.
pub(crate) fn validate(scope: &Scope<'_>, data: &Graph) -> Vec<Failure> {
    let constraints = scope.constraints();
    let mut failures = Vec::new();

    for value in scope.value_nodes() {
        if let Some(datatype) = &constraints.datatype {
            let ok = match value {
                Term::Literal(lit) => {
                    lit.datatype() == datatype.as_ref() && is_well_formed(lit)
                }
                _ => false,
            };
            if !ok {
                failures.push(Failure::new(
                    ConstraintComponent::Datatype,
                    Some(value),
                    format!(
                        "Value {} is not a well-formed literal of datatype {}",
                        describe(value),
                        graph::iri_label(datatype)
                    ),
                ));
            }
        }

        for class in &constraints.class {
            if !graph::has_type(data, value, class) {
                failures.push(Failure::new(
                    ConstraintComponent::Class,
                    Some(value),
                    format!(
                        "Value {} is not an instance of {}",
                        describe(value),
                        graph::term_label(class)
                    ),
                ));
            }
        }

        if let Some(kind) = constraints.node_kind {
            if !kind.matches(value.as_ref()) {
                failures.push(Failure::new(
                    ConstraintComponent::NodeKind,
                    Some(value),
                    format!("Value {} does not have node kind {}", describe(value), kind),
                ));
            }
        }
    }
    failures
}

/// Whether the lexical form is valid for the literal's datatype.
///
/// Datatypes without a known lexical space are always accepted.
pub(crate) fn is_well_formed(lit: &Literal) -> bool {
    let value = lit.value();
    let datatype = lit.datatype();
    if datatype == xsd::STRING || datatype == rdf::LANG_STRING {
        return true;
    }
    if datatype == xsd::BOOLEAN {
        return Boolean::from_str(value).is_ok();
    }
    if datatype == xsd::DECIMAL {
        return is_decimal_lexical(value.trim());
    }
    if datatype == xsd::DOUBLE {
        return Double::from_str(value).is_ok();
    }
    if datatype == xsd::FLOAT {
        return Float::from_str(value).is_ok();
    }
    if datatype == xsd::DATE {
        return Date::from_str(value).is_ok();
    }
    if datatype == xsd::DATE_TIME {
        return DateTime::from_str(value).is_ok();
    }
    if datatype == xsd::TIME {
        return Time::from_str(value).is_ok();
    }
    if let Some((min, max)) = integer_range(datatype) {
        let value = value.trim();
        if !is_integer_lexical(value) {
            return false;
        }
        return match value.parse::<i128>() {
            Ok(n) => !matches!(min, Some(m) if n < m) && !matches!(max, Some(m) if n > m),
            // past i128 only the sign matters against a finite bound
            Err(_) => {
                let negative = value.starts_with('-');
                (min.is_none() || !negative) && (max.is_none() || negative)
            }
        };
    }
    true
}

/// `[+-]?[0-9]+`
pub(crate) fn is_integer_lexical(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)`
pub(crate) fn is_decimal_lexical(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    (!whole.is_empty() || !fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Value bounds of the integer datatypes; `None` means unbounded.
fn integer_range(datatype: NamedNodeRef<'_>) -> Option<(Option<i128>, Option<i128>)> {
    let range = if datatype == xsd::INTEGER {
        (None, None)
    } else if datatype == xsd::LONG {
        (Some(i64::MIN.into()), Some(i64::MAX.into()))
    } else if datatype == xsd::INT {
        (Some(i32::MIN.into()), Some(i32::MAX.into()))
    } else if datatype == xsd::SHORT {
        (Some(i16::MIN.into()), Some(i16::MAX.into()))
    } else if datatype == xsd::BYTE {
        (Some(i8::MIN.into()), Some(i8::MAX.into()))
    } else if datatype == xsd::NON_NEGATIVE_INTEGER {
        (Some(0), None)
    } else if datatype == xsd::POSITIVE_INTEGER {
        (Some(1), None)
    } else if datatype == xsd::NON_POSITIVE_INTEGER {
        (None, Some(0))
    } else if datatype == xsd::NEGATIVE_INTEGER {
        (None, Some(-1))
    } else if datatype == xsd::UNSIGNED_LONG {
        (Some(0), Some(u64::MAX.into()))
    } else if datatype == xsd::UNSIGNED_INT {
        (Some(0), Some(u32::MAX.into()))
    } else if datatype == xsd::UNSIGNED_SHORT {
        (Some(0), Some(u16::MAX.into()))
    } else if datatype == xsd::UNSIGNED_BYTE {
        (Some(0), Some(u8::MAX.into()))
    } else {
        return None;
    };
    Some(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_graph;
    use crate::shape::NodeShape;
    use crate::types::NodeKind;
    use oxigraph::io::RdfFormat;
    use oxigraph::model::{NamedNode, NamedOrBlankNode};

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{}", local)))
    }

    fn shape() -> NodeShape {
        NodeShape::new(NamedOrBlankNode::NamedNode(NamedNode::new_unchecked(
            "http://example.org/S",
        )))
    }

    fn run(shape: &NodeShape, focus: &Term, data: &Graph) -> Vec<Failure> {
        validate(&Scope::Node { shape, focus }, data)
    }

    #[test]
    fn datatype_requires_exact_match() {
        let mut s = shape();
        s.constraints.datatype = Some(xsd::INTEGER.into_owned());
        let data = Graph::new();
        let good = Term::Literal(Literal::new_typed_literal("42", xsd::INTEGER));
        let wrong_type = Term::Literal(Literal::new_typed_literal("42", xsd::INT));
        let ill_formed = Term::Literal(Literal::new_typed_literal("forty", xsd::INTEGER));
        assert!(run(&s, &good, &data).is_empty());
        assert_eq!(run(&s, &wrong_type, &data).len(), 1);
        assert_eq!(run(&s, &ill_formed, &data).len(), 1);
        assert_eq!(run(&s, &ex("iri"), &data).len(), 1);
    }

    #[test]
    fn integer_subtypes_check_their_range() {
        assert!(is_well_formed(&Literal::new_typed_literal("127", xsd::BYTE)));
        assert!(!is_well_formed(&Literal::new_typed_literal("128", xsd::BYTE)));
        assert!(!is_well_formed(&Literal::new_typed_literal("-1", xsd::NON_NEGATIVE_INTEGER)));
        assert!(is_well_formed(&Literal::new_typed_literal("true", xsd::BOOLEAN)));
        assert!(!is_well_formed(&Literal::new_typed_literal("yes", xsd::BOOLEAN)));
        assert!(is_well_formed(&Literal::new_typed_literal("2024-02-29", xsd::DATE)));
    }

    #[test]
    fn integers_past_machine_width_are_well_formed() {
        let huge = "1234567890123456789012345678901234567890123";
        assert!(is_well_formed(&Literal::new_typed_literal(huge, xsd::INTEGER)));
        assert!(is_well_formed(&Literal::new_typed_literal(huge, xsd::POSITIVE_INTEGER)));
        assert!(!is_well_formed(&Literal::new_typed_literal(huge, xsd::LONG)));
        let negative = format!("-{}", huge);
        assert!(is_well_formed(&Literal::new_typed_literal(negative.as_str(), xsd::NEGATIVE_INTEGER)));
        assert!(!is_well_formed(&Literal::new_typed_literal(negative.as_str(), xsd::NON_NEGATIVE_INTEGER)));
        assert!(!is_well_formed(&Literal::new_typed_literal("12a", xsd::INTEGER)));
        assert!(!is_well_formed(&Literal::new_typed_literal("+", xsd::INTEGER)));
        assert!(is_well_formed(&Literal::new_typed_literal(
            "123456789012345678901234567.5",
            xsd::DECIMAL
        )));
        assert!(is_well_formed(&Literal::new_typed_literal(".5", xsd::DECIMAL)));
        assert!(!is_well_formed(&Literal::new_typed_literal(".", xsd::DECIMAL)));
    }

    #[test]
    fn class_uses_direct_types_only() {
        let data = parse_graph(
            "@prefix ex: <http://example.org/> .
             @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
             ex:Dog rdfs:subClassOf ex:Animal .
             ex:rex a ex:Dog .",
            RdfFormat::Turtle,
            None,
        )
        .expect("fixture parses");
        let mut s = shape();
        s.constraints.class.push(ex("Dog"));
        assert!(run(&s, &ex("rex"), &data).is_empty());
        s.constraints.class = vec![ex("Animal")];
        let failures = run(&s, &ex("rex"), &data);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].component, ConstraintComponent::Class);
    }

    #[test]
    fn node_kind() {
        let mut s = shape();
        s.constraints.node_kind = Some(NodeKind::Literal);
        let data = Graph::new();
        assert_eq!(run(&s, &ex("a"), &data).len(), 1);
        let lit = Term::Literal(Literal::new_simple_literal("a"));
        assert!(run(&s, &lit, &data).is_empty());
    }
}
