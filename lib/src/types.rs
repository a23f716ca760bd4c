use crate::graph;
use crate::named_nodes::{SHACL, SHACL_NS};
use oxigraph::model::{Graph, NamedNode, NamedNodeRef, Term, TermRef};
use std::fmt;

/// Identifier of a shape: the IRI or blank node that names it in the shapes graph.
pub type ShapeId = oxigraph::model::NamedOrBlankNode;

/// Represents the severity level of a validation result, corresponding to `sh:severity`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    /// Corresponds to `sh:Info`.
    Info,
    /// Corresponds to `sh:Warning`.
    Warning,
    /// Corresponds to `sh:Violation`.
    #[default]
    Violation,
}

impl Severity {
    /// Creates a `Severity` from a `Term` if it matches a SHACL severity IRI.
    pub fn from_term(term: &Term) -> Option<Self> {
        let shacl = SHACL::new();
        match term {
            Term::NamedNode(nn) if nn.as_ref() == shacl.info => Some(Severity::Info),
            Term::NamedNode(nn) if nn.as_ref() == shacl.warning => Some(Severity::Warning),
            Term::NamedNode(nn) if nn.as_ref() == shacl.violation => Some(Severity::Violation),
            _ => None,
        }
    }

    pub fn iri(&self) -> NamedNodeRef<'static> {
        let shacl = SHACL::new();
        match self {
            Severity::Info => shacl.info,
            Severity::Warning => shacl.warning,
            Severity::Violation => shacl.violation,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Violation => write!(f, "Violation"),
        }
    }
}

/// Values of `sh:nodeKind`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    pub fn from_term(term: &Term) -> Option<Self> {
        let shacl = SHACL::new();
        let Term::NamedNode(nn) = term else {
            return None;
        };
        let nn = nn.as_ref();
        if nn == shacl.iri {
            Some(NodeKind::Iri)
        } else if nn == shacl.blank_node {
            Some(NodeKind::BlankNode)
        } else if nn == shacl.literal {
            Some(NodeKind::Literal)
        } else if nn == shacl.blank_node_or_iri {
            Some(NodeKind::BlankNodeOrIri)
        } else if nn == shacl.blank_node_or_literal {
            Some(NodeKind::BlankNodeOrLiteral)
        } else if nn == shacl.iri_or_literal {
            Some(NodeKind::IriOrLiteral)
        } else {
            None
        }
    }

    /// Whether the term's tag is one this kind admits.
    pub fn matches(&self, term: TermRef<'_>) -> bool {
        let (iri, blank, literal) = match term {
            TermRef::NamedNode(_) => (true, false, false),
            TermRef::BlankNode(_) => (false, true, false),
            TermRef::Literal(_) => (false, false, true),
            #[allow(unreachable_patterns)]
            _ => (false, false, false),
        };
        match self {
            NodeKind::Iri => iri,
            NodeKind::BlankNode => blank,
            NodeKind::Literal => literal,
            NodeKind::BlankNodeOrIri => blank || iri,
            NodeKind::BlankNodeOrLiteral => blank || literal,
            NodeKind::IriOrLiteral => iri || literal,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Iri => "sh:IRI",
            NodeKind::BlankNode => "sh:BlankNode",
            NodeKind::Literal => "sh:Literal",
            NodeKind::BlankNodeOrIri => "sh:BlankNodeOrIRI",
            NodeKind::BlankNodeOrLiteral => "sh:BlankNodeOrLiteral",
            NodeKind::IriOrLiteral => "sh:IRIOrLiteral",
        };
        write!(f, "{}", name)
    }
}

/// Represents a SHACL target, which specifies the nodes to be validated against a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Targets all instances of a given class (`sh:targetClass`).
    Class(Term),
    /// Targets a specific node (`sh:targetNode`).
    Node(Term),
    /// Targets all instances of the shape itself, when the shape is also a class.
    ImplicitClass(Term),
    /// Targets all subjects of triples with a given predicate (`sh:targetSubjectsOf`).
    SubjectsOf(NamedNode),
    /// Targets all objects of triples with a given predicate (`sh:targetObjectsOf`).
    ObjectsOf(NamedNode),
}

impl Target {
    /// Retrieves the focus nodes this target selects in the data graph.
    pub fn target_nodes(&self, data: &Graph) -> Vec<Term> {
        match self {
            Target::Node(t) => vec![t.clone()],
            Target::Class(c) | Target::ImplicitClass(c) => graph::instances_of(data, c),
            Target::SubjectsOf(p) => graph::subjects_of(data, p.as_ref()),
            Target::ObjectsOf(p) => graph::objects_of(data, p.as_ref()),
        }
    }
}

/// The rule family responsible for a validation result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintComponent {
    MinCount,
    MaxCount,
    Datatype,
    Class,
    NodeKind,
    Pattern,
    MinLength,
    MaxLength,
    LanguageIn,
    In,
    HasValue,
    MinInclusive,
    MinExclusive,
    MaxInclusive,
    MaxExclusive,
    QualifiedMinCount,
    QualifiedMaxCount,
    Node,
    And,
    Or,
    Xone,
    Not,
    Sparql,
}

impl ConstraintComponent {
    pub fn local_name(&self) -> &'static str {
        match self {
            ConstraintComponent::MinCount => "MinCountConstraintComponent",
            ConstraintComponent::MaxCount => "MaxCountConstraintComponent",
            ConstraintComponent::Datatype => "DatatypeConstraintComponent",
            ConstraintComponent::Class => "ClassConstraintComponent",
            ConstraintComponent::NodeKind => "NodeKindConstraintComponent",
            ConstraintComponent::Pattern => "PatternConstraintComponent",
            ConstraintComponent::MinLength => "MinLengthConstraintComponent",
            ConstraintComponent::MaxLength => "MaxLengthConstraintComponent",
            ConstraintComponent::LanguageIn => "LanguageInConstraintComponent",
            ConstraintComponent::In => "InConstraintComponent",
            ConstraintComponent::HasValue => "HasValueConstraintComponent",
            ConstraintComponent::MinInclusive => "MinInclusiveConstraintComponent",
            ConstraintComponent::MinExclusive => "MinExclusiveConstraintComponent",
            ConstraintComponent::MaxInclusive => "MaxInclusiveConstraintComponent",
            ConstraintComponent::MaxExclusive => "MaxExclusiveConstraintComponent",
            ConstraintComponent::QualifiedMinCount => "QualifiedMinCountConstraintComponent",
            ConstraintComponent::QualifiedMaxCount => "QualifiedMaxCountConstraintComponent",
            ConstraintComponent::Node => "NodeConstraintComponent",
            ConstraintComponent::And => "AndConstraintComponent",
            ConstraintComponent::Or => "OrConstraintComponent",
            ConstraintComponent::Xone => "XoneConstraintComponent",
            ConstraintComponent::Not => "NotConstraintComponent",
            ConstraintComponent::Sparql => "SPARQLConstraintComponent",
        }
    }

    /// The `sh:sourceConstraintComponent` IRI.
    pub fn iri(&self) -> NamedNode {
        NamedNode::new_unchecked(format!("{}{}", SHACL_NS, self.local_name()))
    }

    pub fn from_iri(iri: &str) -> Option<Self> {
        let local = iri.strip_prefix(SHACL_NS)?;
        Self::ALL.iter().copied().find(|c| c.local_name() == local)
    }

    pub const ALL: [ConstraintComponent; 23] = [
        ConstraintComponent::MinCount,
        ConstraintComponent::MaxCount,
        ConstraintComponent::Datatype,
        ConstraintComponent::Class,
        ConstraintComponent::NodeKind,
        ConstraintComponent::Pattern,
        ConstraintComponent::MinLength,
        ConstraintComponent::MaxLength,
        ConstraintComponent::LanguageIn,
        ConstraintComponent::In,
        ConstraintComponent::HasValue,
        ConstraintComponent::MinInclusive,
        ConstraintComponent::MinExclusive,
        ConstraintComponent::MaxInclusive,
        ConstraintComponent::MaxExclusive,
        ConstraintComponent::QualifiedMinCount,
        ConstraintComponent::QualifiedMaxCount,
        ConstraintComponent::Node,
        ConstraintComponent::And,
        ConstraintComponent::Or,
        ConstraintComponent::Xone,
        ConstraintComponent::Not,
        ConstraintComponent::Sparql,
    ];
}

impl fmt::Display for ConstraintComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sh:{}", self.local_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{BlankNode, Literal};

    #[test]
    fn severity_round_trips_through_iri() {
        for severity in [Severity::Info, Severity::Warning, Severity::Violation] {
            let term = Term::NamedNode(severity.iri().into_owned());
            assert_eq!(Severity::from_term(&term), Some(severity));
        }
        assert_eq!(Severity::default(), Severity::Violation);
    }

    #[test]
    fn node_kind_unions() {
        let iri = Term::NamedNode(NamedNode::new_unchecked("http://example.org/a"));
        let blank = Term::BlankNode(BlankNode::default());
        let literal = Term::Literal(Literal::new_simple_literal("x"));

        assert!(NodeKind::Iri.matches(iri.as_ref()));
        assert!(!NodeKind::Iri.matches(blank.as_ref()));
        assert!(NodeKind::BlankNodeOrIri.matches(blank.as_ref()));
        assert!(!NodeKind::BlankNodeOrIri.matches(literal.as_ref()));
        assert!(NodeKind::IriOrLiteral.matches(literal.as_ref()));
        assert!(NodeKind::BlankNodeOrLiteral.matches(literal.as_ref()));
        assert!(!NodeKind::BlankNodeOrLiteral.matches(iri.as_ref()));
    }

    #[test]
    fn component_iris_parse_back() {
        for component in ConstraintComponent::ALL {
            assert_eq!(
                ConstraintComponent::from_iri(component.iri().as_str()),
                Some(component)
            );
        }
    }
}
