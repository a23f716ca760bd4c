//! Constraint families.
//!
//! Every family exposes a `validate` function over a [`Scope`]. The scope is
//! either a node shape applied to its focus node, or a property shape applied
//! to the values reached through its path. A family returns one [`Failure`]
//! per broken constraint; the orchestrator turns failures into report results.

pub(crate) mod cardinality;
pub(crate) mod qualified;
pub(crate) mod shape_based;
pub(crate) mod sparql;
pub(crate) mod string_based;
pub(crate) mod value;
pub(crate) mod value_type;

use crate::context::{Evaluation, TimedOut};
use crate::graph;
use crate::shape::{Constraints, NodeShape, PropertyShape};
use crate::types::{ConstraintComponent, ShapeId};
use oxigraph::model::Term;

/// A single broken constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub component: ConstraintComponent,
    pub value: Option<Term>,
    /// Generated description, used when no `sh:message` applies.
    pub message: String,
    /// Message declared on the constraint itself, preferred over the shape's.
    pub declared_message: Option<String>,
    /// The sub-shape responsible, for logical, qualified and `sh:node` failures.
    pub shape: Option<ShapeId>,
}

impl Failure {
    pub fn new(component: ConstraintComponent, value: Option<&Term>, message: String) -> Self {
        Failure {
            component,
            value: value.cloned(),
            message,
            declared_message: None,
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: &ShapeId) -> Self {
        self.shape = Some(shape.clone());
        self
    }
}

/// The shape being applied and the nodes it is applied to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'s> {
    Node {
        shape: &'s NodeShape,
        focus: &'s Term,
    },
    Property {
        shape: &'s PropertyShape,
        focus: &'s Term,
        values: &'s [Term],
    },
}

impl<'s> Scope<'s> {
    pub fn focus(&self) -> &'s Term {
        match *self {
            Scope::Node { focus, .. } | Scope::Property { focus, .. } => focus,
        }
    }

    /// The nodes value constraints apply to: the focus node itself at node
    /// level, the path values at property level.
    pub fn value_nodes(&self) -> &'s [Term] {
        match *self {
            Scope::Node { focus, .. } => std::slice::from_ref(focus),
            Scope::Property { values, .. } => values,
        }
    }

    pub fn constraints(&self) -> &'s Constraints {
        match *self {
            Scope::Node { shape, .. } => &shape.constraints,
            Scope::Property { shape, .. } => &shape.constraints,
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Scope::Property { .. })
    }
}

/// The closed set of constraint families, evaluated in this order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ConstraintFamily {
    Cardinality,
    ValueType,
    String,
    Value,
    Qualified,
    ShapeBased,
    Sparql,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 7] = [
        ConstraintFamily::Cardinality,
        ConstraintFamily::ValueType,
        ConstraintFamily::String,
        ConstraintFamily::Value,
        ConstraintFamily::Qualified,
        ConstraintFamily::ShapeBased,
        ConstraintFamily::Sparql,
    ];

    /// Runs this family's constraints. `depth` is the recursion depth of the
    /// shape being applied.
    pub fn validate(
        self,
        scope: &Scope<'_>,
        eval: &mut Evaluation<'_, '_>,
        depth: usize,
    ) -> Result<Vec<Failure>, TimedOut> {
        match self {
            ConstraintFamily::Cardinality => Ok(cardinality::validate(scope)),
            ConstraintFamily::ValueType => Ok(value_type::validate(scope, eval.ctx.data)),
            ConstraintFamily::String => Ok(string_based::validate(scope)),
            ConstraintFamily::Value => Ok(value::validate(scope)),
            ConstraintFamily::Qualified => qualified::validate(scope, eval, depth),
            ConstraintFamily::ShapeBased => shape_based::validate(scope, eval, depth),
            ConstraintFamily::Sparql => Ok(sparql::validate(scope, eval)),
        }
    }
}

/// Short rendering of a term for generated messages.
pub(crate) fn describe(term: &Term) -> String {
    match term {
        Term::Literal(lit) => format!("\"{}\"", lit.value()),
        other => graph::term_label(other),
    }
}
