//! Lookups over an in-memory graph.
//!
//! `oxigraph::model::Graph` keeps subject, predicate and object indexes, so every
//! helper here is an indexed lookup rather than a scan.

use crate::error::ParseError;
use oxigraph::model::vocab::rdf;
use oxigraph::model::{
    BlankNode, Graph, NamedNode, NamedNodeRef, NamedOrBlankNode, SubjectRef, Term, TermRef,
    TripleRef,
};
use std::collections::HashSet;

/// Views a term as a triple subject. Literals cannot be subjects.
pub(crate) fn as_subject(term: &Term) -> Option<SubjectRef<'_>> {
    match term {
        Term::NamedNode(nn) => Some(nn.as_ref().into()),
        Term::BlankNode(bn) => Some(bn.as_ref().into()),
        _ => None,
    }
}

pub(crate) fn id_as_subject(id: &NamedOrBlankNode) -> SubjectRef<'_> {
    match id {
        NamedOrBlankNode::NamedNode(nn) => nn.as_ref().into(),
        NamedOrBlankNode::BlankNode(bn) => bn.as_ref().into(),
    }
}

pub(crate) fn id_to_term(id: &NamedOrBlankNode) -> Term {
    match id {
        NamedOrBlankNode::NamedNode(nn) => Term::NamedNode(nn.clone()),
        NamedOrBlankNode::BlankNode(bn) => Term::BlankNode(bn.clone()),
    }
}

pub(crate) fn term_to_id(term: &Term) -> Option<NamedOrBlankNode> {
    match term {
        Term::NamedNode(nn) => Some(NamedOrBlankNode::NamedNode(nn.clone())),
        Term::BlankNode(bn) => Some(NamedOrBlankNode::BlankNode(bn.clone())),
        _ => None,
    }
}

fn subject_to_term(subject: SubjectRef<'_>) -> Option<Term> {
    match subject {
        SubjectRef::NamedNode(nn) => Some(Term::NamedNode(nn.into_owned())),
        SubjectRef::BlankNode(bn) => Some(Term::BlankNode(bn.into_owned())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn is_nil(term: &Term) -> bool {
    matches!(term, Term::NamedNode(nn) if nn.as_ref() == rdf::NIL)
}

/// All objects of `(focus, predicate, ?)`. A literal focus node has no values.
pub(crate) fn values(graph: &Graph, focus: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term> {
    match as_subject(focus) {
        Some(subject) => graph
            .objects_for_subject_predicate(subject, predicate)
            .map(TermRef::into_owned)
            .collect(),
        None => Vec::new(),
    }
}

/// The first object of `(subject, predicate, ?)`, if any.
pub(crate) fn object(
    graph: &Graph,
    subject: SubjectRef<'_>,
    predicate: NamedNodeRef<'_>,
) -> Option<Term> {
    graph
        .object_for_subject_predicate(subject, predicate)
        .map(TermRef::into_owned)
}

/// Every node with a direct `rdf:type` assertion to `class`.
///
/// No subclass reasoning is applied.
pub(crate) fn instances_of(graph: &Graph, class: &Term) -> Vec<Term> {
    graph
        .subjects_for_predicate_object(rdf::TYPE, class.as_ref())
        .filter_map(subject_to_term)
        .collect()
}

/// Whether `node` has a direct `rdf:type` assertion to `class`.
pub(crate) fn has_type(graph: &Graph, node: &Term, class: &Term) -> bool {
    match as_subject(node) {
        Some(subject) => graph.contains(TripleRef::new(subject, rdf::TYPE, class.as_ref())),
        None => false,
    }
}

/// Distinct subjects of triples using `predicate`.
pub(crate) fn subjects_of(graph: &Graph, predicate: NamedNodeRef<'_>) -> Vec<Term> {
    let mut seen = HashSet::new();
    graph
        .triples_for_predicate(predicate)
        .filter_map(|t| subject_to_term(t.subject))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Distinct objects of triples using `predicate`.
pub(crate) fn objects_of(graph: &Graph, predicate: NamedNodeRef<'_>) -> Vec<Term> {
    let mut seen = HashSet::new();
    graph
        .triples_for_predicate(predicate)
        .map(|t| t.object.into_owned())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Materializes an `rdf:first`/`rdf:rest` list into its members, in order.
///
/// The walk is iterative. A cell that is visited twice is a
/// [`ParseError::MalformedList`]; more than `max_depth` members is a
/// [`ParseError::ListTooLong`].
pub(crate) fn read_list(
    graph: &Graph,
    head: &Term,
    max_depth: usize,
) -> Result<Vec<Term>, ParseError> {
    let mut items = Vec::new();
    let mut visited = HashSet::new();
    let mut current = head.clone();
    while !is_nil(&current) {
        if !visited.insert(current.clone()) {
            return Err(ParseError::MalformedList {
                head: head.to_string(),
                message: format!("list cell {} is visited twice", current),
            });
        }
        if items.len() >= max_depth {
            return Err(ParseError::ListTooLong {
                head: head.to_string(),
                max_depth,
            });
        }
        let cell = as_subject(&current).ok_or_else(|| ParseError::MalformedList {
            head: head.to_string(),
            message: format!("list cell {} is a literal", current),
        })?;
        let first = object(graph, cell, rdf::FIRST).ok_or_else(|| ParseError::MalformedList {
            head: head.to_string(),
            message: format!("list cell {} has no rdf:first", current),
        })?;
        let rest = object(graph, cell, rdf::REST).ok_or_else(|| ParseError::MalformedList {
            head: head.to_string(),
            message: format!("list cell {} has no rdf:rest", current),
        })?;
        items.push(first);
        current = rest;
    }
    Ok(items)
}

/// Short label for log lines and messages: the local name of an IRI, the id
/// of a blank node, the lexical form of a literal.
pub(crate) fn term_label(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => iri_label(nn),
        Term::BlankNode(bn) => format!("_:{}", bn.as_str()),
        Term::Literal(lit) => lit.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

pub(crate) fn iri_label(nn: &NamedNode) -> String {
    let iri = nn.as_str();
    match iri.rfind(['#', '/']) {
        Some(idx) if idx + 1 < iri.len() => iri[idx + 1..].to_string(),
        _ => iri.to_string(),
    }
}

pub(crate) fn id_label(id: &NamedOrBlankNode) -> String {
    match id {
        NamedOrBlankNode::NamedNode(nn) => iri_label(nn),
        NamedOrBlankNode::BlankNode(bn) => label_blank(bn),
    }
}

fn label_blank(bn: &BlankNode) -> String {
    format!("_:{}", bn.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_graph;
    use oxigraph::io::RdfFormat;
    use oxigraph::model::Literal;
    use std::error::Error;

    const EX: &str = "http://example.org/";

    fn ex(local: &str) -> Term {
        Term::NamedNode(NamedNode::new_unchecked(format!("{}{}", EX, local)))
    }

    fn turtle(body: &str) -> Graph {
        let text = format!("@prefix ex: <{}> .\n{}", EX, body);
        parse_graph(&text, RdfFormat::Turtle, None).expect("fixture parses")
    }

    #[test]
    fn values_follow_a_single_predicate() {
        let g = turtle("ex:a ex:p 1, 2 ; ex:q 3 .");
        let p = NamedNode::new_unchecked(format!("{}p", EX));
        assert_eq!(values(&g, &ex("a"), p.as_ref()).len(), 2);
        let lit = Term::Literal(Literal::new_simple_literal("a"));
        assert!(values(&g, &lit, p.as_ref()).is_empty());
    }

    #[test]
    fn instances_are_direct_only() {
        let g = turtle(
            "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             ex:Dog rdfs:subClassOf ex:Animal .\n\
             ex:rex a ex:Dog .\n\
             ex:tom a ex:Animal .",
        );
        let animals = instances_of(&g, &ex("Animal"));
        assert_eq!(animals, vec![ex("tom")]);
        assert!(has_type(&g, &ex("rex"), &ex("Dog")));
        assert!(!has_type(&g, &ex("rex"), &ex("Animal")));
    }

    #[test]
    fn reads_lists_in_order() -> Result<(), Box<dyn Error>> {
        let g = turtle("ex:s ex:list (ex:x ex:y ex:z) .");
        let p = NamedNode::new_unchecked(format!("{}list", EX));
        let head = values(&g, &ex("s"), p.as_ref()).remove(0);
        let items = read_list(&g, &head, 100)?;
        assert_eq!(items, vec![ex("x"), ex("y"), ex("z")]);
        Ok(())
    }

    #[test]
    fn long_lists_are_rejected() {
        let g = turtle("ex:s ex:list (1 2 3 4) .");
        let p = NamedNode::new_unchecked(format!("{}list", EX));
        let head = values(&g, &ex("s"), p.as_ref()).remove(0);
        assert!(read_list(&g, &head, 4).is_ok());
        assert!(matches!(
            read_list(&g, &head, 3),
            Err(ParseError::ListTooLong { max_depth: 3, .. })
        ));
    }

    #[test]
    fn cyclic_lists_are_malformed() {
        let g = turtle(
            "@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n\
             ex:c1 rdf:first 1 ; rdf:rest ex:c2 .\n\
             ex:c2 rdf:first 2 ; rdf:rest ex:c1 .",
        );
        assert!(matches!(
            read_list(&g, &ex("c1"), 100),
            Err(ParseError::MalformedList { ref message, .. }) if message.contains("visited twice")
        ));
        // the revisit is caught before the depth limit would be
        assert!(matches!(
            read_list(&g, &ex("c1"), 3),
            Err(ParseError::MalformedList { .. })
        ));
    }

    #[test]
    fn broken_lists_are_malformed() {
        let g = turtle(
            "@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n\
             ex:c1 rdf:first 1 .",
        );
        assert!(matches!(
            read_list(&g, &ex("c1"), 100),
            Err(ParseError::MalformedList { .. })
        ));
    }

    #[test]
    fn labels() {
        assert_eq!(term_label(&ex("Person")), "Person");
        assert_eq!(
            iri_label(&NamedNode::new_unchecked("http://www.w3.org/ns/shacl#minCount")),
            "minCount"
        );
    }
}
