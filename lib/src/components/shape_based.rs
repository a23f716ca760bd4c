use super::{describe, Failure, Scope};
use crate::context::{Conformance, Evaluation, TimedOut};
use crate::graph;
use crate::types::{ConstraintComponent, ShapeId};
use oxigraph::model::Term;

/// `sh:node` on either kind of shape, and the logical operators `sh:and`,
/// `sh:or`, `sh:xone` and `sh:not` on node shapes.
///
/// A branch that hit the recursion limit ([`Conformance::Unknown`]) never
/// produces a failure.
pub(crate) fn validate(
    scope: &Scope<'_>,
    eval: &mut Evaluation<'_, '_>,
    depth: usize,
) -> Result<Vec<Failure>, TimedOut> {
    let mut failures = Vec::new();

    for value in scope.value_nodes() {
        for id in &scope.constraints().node {
            if eval.conforms(value, id, depth)? == Conformance::Fails {
                failures.push(
                    Failure::new(
                        ConstraintComponent::Node,
                        Some(value),
                        format!(
                            "Value {} does not conform to shape {}",
                            describe(value),
                            graph::id_label(id)
                        ),
                    )
                    .with_shape(id),
                );
            }
        }
    }

    let Scope::Node { shape, focus } = *scope else {
        return Ok(failures);
    };

    if let Some(failed) = first_failing(eval, focus, &shape.and, depth)? {
        failures.push(
            Failure::new(
                ConstraintComponent::And,
                Some(focus),
                format!(
                    "Node {} does not conform to shape {} required by sh:and",
                    describe(focus),
                    graph::id_label(failed)
                ),
            )
            .with_shape(failed),
        );
    }

    if !shape.or.is_empty() {
        let mut passed = false;
        for id in &shape.or {
            if eval.conforms(focus, id, depth)? != Conformance::Fails {
                passed = true;
                break;
            }
        }
        if !passed {
            failures.push(Failure::new(
                ConstraintComponent::Or,
                Some(focus),
                format!(
                    "Node {} does not conform to any of the {} shape(s) in sh:or",
                    describe(focus),
                    shape.or.len()
                ),
            ));
        }
    }

    if !shape.xone.is_empty() {
        let mut passes = 0usize;
        let mut unknown = false;
        for id in &shape.xone {
            match eval.conforms(focus, id, depth)? {
                Conformance::Conforms => passes += 1,
                Conformance::Fails => {}
                Conformance::Unknown => unknown = true,
            }
        }
        if !unknown && passes != 1 {
            failures.push(Failure::new(
                ConstraintComponent::Xone,
                Some(focus),
                format!(
                    "Node {} conforms to {} of the shapes in sh:xone, expected exactly one",
                    describe(focus),
                    passes
                ),
            ));
        }
    }

    if let Some(id) = &shape.not {
        if eval.conforms(focus, id, depth)? == Conformance::Conforms {
            failures.push(
                Failure::new(
                    ConstraintComponent::Not,
                    Some(focus),
                    format!(
                        "Node {} conforms to shape {} negated by sh:not",
                        describe(focus),
                        graph::id_label(id)
                    ),
                )
                .with_shape(id),
            );
        }
    }

    Ok(failures)
}

/// The first member of `ids` the focus node fails, stopping there.
fn first_failing<'i>(
    eval: &mut Evaluation<'_, '_>,
    focus: &Term,
    ids: &'i [ShapeId],
    depth: usize,
) -> Result<Option<&'i ShapeId>, TimedOut> {
    for id in ids {
        if eval.conforms(focus, id, depth)? == Conformance::Fails {
            return Ok(Some(id));
        }
    }
    Ok(None)
}
