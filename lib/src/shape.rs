use crate::components::sparql::prepare_query;
use crate::types::{NodeKind, Severity, ShapeId, Target};
use oxigraph::model::{Literal, NamedNode, Term};
use oxigraph::sparql::Query;
use regex::Regex;

/// A compiled `sh:pattern`, with the text it was compiled from.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
    flags: Option<String>,
}

impl Pattern {
    pub(crate) fn new(regex: Regex, source: String, flags: Option<String>) -> Self {
        Pattern {
            regex,
            source,
            flags,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Option<&str> {
        self.flags.as_deref()
    }
}

/// Value constraints shared by node shapes and property shapes.
///
/// On a node shape they apply to the focus node itself; on a property shape
/// they apply to every value reached through the shape's path.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub datatype: Option<NamedNode>,
    /// Required classes; each one is checked independently.
    pub class: Vec<Term>,
    pub node_kind: Option<NodeKind>,
    pub min_inclusive: Option<Literal>,
    pub min_exclusive: Option<Literal>,
    pub max_inclusive: Option<Literal>,
    pub max_exclusive: Option<Literal>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<Pattern>,
    pub language_in: Option<Vec<String>>,
    pub in_values: Option<Vec<Term>>,
    pub has_value: Option<Term>,
    /// `sh:node` references.
    pub node: Vec<ShapeId>,
}

/// `sh:qualifiedValueShape` with its count bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualified {
    pub shape: ShapeId,
    pub min_count: Option<u64>,
    pub max_count: Option<u64>,
}

/// A SELECT-based constraint attached to a node shape through `sh:sparql`.
#[derive(Debug, Clone)]
pub struct SparqlConstraint {
    pub id: Term,
    /// Query text with any `sh:prefixes` declarations already prepended.
    pub query: String,
    pub message: Option<String>,
    pub deactivated: bool,
    /// The checked and parsed query, or why it was refused.
    pub(crate) prepared: Result<Query, String>,
}

impl SparqlConstraint {
    pub(crate) fn new(id: Term, query: String) -> Self {
        let prepared = prepare_query(&query);
        SparqlConstraint {
            id,
            query,
            message: None,
            deactivated: false,
            prepared,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_ok()
    }
}

/// How a shape refers to another shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    And,
    Or,
    Xone,
    Not,
    Node,
    Qualified,
}

impl ReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::And => "and",
            ReferenceKind::Or => "or",
            ReferenceKind::Xone => "xone",
            ReferenceKind::Not => "not",
            ReferenceKind::Node => "node",
            ReferenceKind::Qualified => "qualified",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyShape {
    pub id: ShapeId,
    pub path: NamedNode,
    pub constraints: Constraints,
    pub min_count: Option<u64>,
    pub max_count: Option<u64>,
    pub qualified: Option<Qualified>,
    pub message: Option<String>,
    pub severity: Severity,
    pub deactivated: bool,
}

impl PropertyShape {
    pub fn new(id: ShapeId, path: NamedNode) -> Self {
        PropertyShape {
            id,
            path,
            constraints: Constraints::default(),
            min_count: None,
            max_count: None,
            qualified: None,
            message: None,
            severity: Severity::default(),
            deactivated: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeShape {
    pub id: ShapeId,
    pub target_classes: Vec<Term>,
    pub target_nodes: Vec<Term>,
    pub target_subjects_of: Vec<NamedNode>,
    pub target_objects_of: Vec<NamedNode>,
    /// Set when the shape is itself declared as a class.
    pub implicit_class_target: Option<Term>,
    pub property_shapes: Vec<PropertyShape>,
    pub constraints: Constraints,
    pub and: Vec<ShapeId>,
    pub or: Vec<ShapeId>,
    /// Duplicates are kept: each occurrence is counted separately.
    pub xone: Vec<ShapeId>,
    pub not: Option<ShapeId>,
    pub sparql_constraints: Vec<SparqlConstraint>,
    pub message: Option<String>,
    pub severity: Severity,
    pub deactivated: bool,
}

impl NodeShape {
    pub fn new(id: ShapeId) -> Self {
        NodeShape {
            id,
            target_classes: Vec::new(),
            target_nodes: Vec::new(),
            target_subjects_of: Vec::new(),
            target_objects_of: Vec::new(),
            implicit_class_target: None,
            property_shapes: Vec::new(),
            constraints: Constraints::default(),
            and: Vec::new(),
            or: Vec::new(),
            xone: Vec::new(),
            not: None,
            sparql_constraints: Vec::new(),
            message: None,
            severity: Severity::default(),
            deactivated: false,
        }
    }

    pub fn targets(&self) -> Vec<Target> {
        let mut targets = Vec::new();
        targets.extend(self.target_classes.iter().cloned().map(Target::Class));
        targets.extend(self.target_nodes.iter().cloned().map(Target::Node));
        targets.extend(self.implicit_class_target.iter().cloned().map(Target::ImplicitClass));
        targets.extend(self.target_subjects_of.iter().cloned().map(Target::SubjectsOf));
        targets.extend(self.target_objects_of.iter().cloned().map(Target::ObjectsOf));
        targets
    }

    pub fn has_targets(&self) -> bool {
        !(self.target_classes.is_empty()
            && self.target_nodes.is_empty()
            && self.implicit_class_target.is_none()
            && self.target_subjects_of.is_empty()
            && self.target_objects_of.is_empty())
    }

    /// Every shape this one refers to, including references made by its
    /// property shapes, in declaration order.
    pub fn references(&self) -> Vec<(ReferenceKind, &ShapeId)> {
        let mut refs = Vec::new();
        refs.extend(self.and.iter().map(|id| (ReferenceKind::And, id)));
        refs.extend(self.or.iter().map(|id| (ReferenceKind::Or, id)));
        refs.extend(self.xone.iter().map(|id| (ReferenceKind::Xone, id)));
        refs.extend(self.not.iter().map(|id| (ReferenceKind::Not, id)));
        refs.extend(self.constraints.node.iter().map(|id| (ReferenceKind::Node, id)));
        for property in &self.property_shapes {
            refs.extend(
                property
                    .constraints
                    .node
                    .iter()
                    .map(|id| (ReferenceKind::Node, id)),
            );
            if let Some(qualified) = &property.qualified {
                refs.push((ReferenceKind::Qualified, &qualified.shape));
            }
        }
        refs
    }
}
