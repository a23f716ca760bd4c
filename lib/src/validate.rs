//! Validation orchestrator.
//!
//! A run is split into one task per targeted node shape. Each task validates
//! all of its shape's target nodes in turn, owns its own deadline and
//! diagnostics, and hands its results back when it finishes; the report is
//! assembled once from the collected task outputs.

use crate::components::{ConstraintFamily, Failure, Scope};
use crate::context::{Evaluation, TimedOut, ValidationContext};
use crate::error::{Error, Result};
use crate::graph;
use crate::options::ValidationOptions;
use crate::parser::parse_shapes;
use crate::report::{Diagnostic, ValidationReport, ValidationResult};
use crate::shape::NodeShape;
use crate::shape_map::ShapeMap;
use crate::types::{Severity, ShapeId};
use log::{debug, error, info};
use oxigraph::model::{Graph, NamedNode, Term};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Results and diagnostics produced by one shape task.
type TaskOutput = (Vec<ValidationResult>, Vec<Diagnostic>);

type TaskResult = std::result::Result<Vec<ValidationResult>, TimedOut>;

/// Reads the shapes of `shapes_graph` into a [`ShapeMap`].
pub(crate) fn load_shapes(shapes_graph: &Graph, options: &ValidationOptions) -> Result<ShapeMap> {
    let shapes = parse_shapes(shapes_graph, options.max_list_depth)?;
    Ok(ShapeMap::build(shapes)?)
}

/// Validates `data` against every targeted shape of `shape_map`.
pub(crate) fn run(
    data: &Graph,
    shape_map: &ShapeMap,
    options: &ValidationOptions,
) -> Result<ValidationReport> {
    options.check()?;
    let started = Instant::now();
    let ctx = ValidationContext::new(data, shape_map, options);
    let tasks: Vec<&NodeShape> = shape_map.targeted().collect();
    debug!(
        "validating {} targeted shape(s) of {} against {} data triple(s)",
        tasks.len(),
        shape_map.len(),
        data.len()
    );

    let outputs: Vec<TaskOutput> = if options.parallel {
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.max_concurrency)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        pool.install(|| tasks.par_iter().map(|shape| run_task(&ctx, shape)).collect())
    } else {
        tasks.iter().map(|shape| run_task(&ctx, shape)).collect()
    };

    let mut results = Vec::new();
    let mut diagnostics = Vec::new();
    for (task_results, task_diagnostics) in outputs {
        results.extend(task_results);
        diagnostics.extend(task_diagnostics);
    }
    let report = ValidationReport::new(results, diagnostics);
    info!(
        "validation finished in {:?}: conforms={}, {} result(s), {} diagnostic(s)",
        started.elapsed(),
        report.conforms(),
        report.results().len(),
        report.diagnostics().len()
    );
    Ok(report)
}

/// Runs one shape task. Timeouts and panics end the task with no results.
fn run_task(ctx: &ValidationContext<'_>, shape: &NodeShape) -> TaskOutput {
    debug!("validating shape {}", graph::id_label(&shape.id));
    guarded(ctx, shape, validate_targets)
}

fn guarded<F>(ctx: &ValidationContext<'_>, shape: &NodeShape, body: F) -> TaskOutput
where
    F: FnOnce(&mut Evaluation<'_, '_>, &NodeShape) -> TaskResult,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut eval = Evaluation::new(ctx, shape.id.clone());
        let results = body(&mut eval, shape);
        (results, eval.into_diagnostics())
    }));
    match outcome {
        Ok((Ok(results), diagnostics)) => (results, diagnostics),
        Ok((Err(TimedOut), mut diagnostics)) => {
            error!(
                "shape {} timed out after {} ms; its results are dropped",
                graph::id_label(&shape.id),
                ctx.options.timeout_ms()
            );
            diagnostics.push(Diagnostic::ShapeTimedOut {
                shape: shape.id.clone(),
                timeout_ms: ctx.options.timeout_ms(),
            });
            (Vec::new(), diagnostics)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(
                "shape {} failed: {}; its results are dropped",
                graph::id_label(&shape.id),
                message
            );
            (
                Vec::new(),
                vec![Diagnostic::ShapeFailed {
                    shape: shape.id.clone(),
                    message,
                }],
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

fn validate_targets(eval: &mut Evaluation<'_, '_>, shape: &NodeShape) -> TaskResult {
    let mut seen = HashSet::new();
    let mut focus_nodes = Vec::new();
    for target in shape.targets() {
        for node in target.target_nodes(eval.ctx.data) {
            if seen.insert(node.clone()) {
                focus_nodes.push(node);
            }
        }
    }
    debug!(
        "shape {} has {} focus node(s)",
        graph::id_label(&shape.id),
        focus_nodes.len()
    );

    let mut results = Vec::new();
    for focus in &focus_nodes {
        eval.check_deadline()?;
        results.extend(validate_node(eval, shape, focus, 0)?);
    }
    Ok(results)
}

/// Validates `focus` against `shape` and its property shapes.
///
/// `depth` counts how many shape references were followed to get here.
pub(crate) fn validate_node(
    eval: &mut Evaluation<'_, '_>,
    shape: &NodeShape,
    focus: &Term,
    depth: usize,
) -> std::result::Result<Vec<ValidationResult>, TimedOut> {
    if shape.deactivated {
        return Ok(Vec::new());
    }
    let mut results = Vec::new();

    let scope = Scope::Node { shape, focus };
    let source = Source {
        id: &shape.id,
        path: None,
        severity: shape.severity,
        message: shape.message.as_deref(),
    };
    for family in ConstraintFamily::ALL {
        for failure in family.validate(&scope, eval, depth)? {
            results.push(source.result(focus, failure));
        }
    }

    for property in shape.property_shapes.iter().filter(|p| !p.deactivated) {
        let values = graph::values(eval.ctx.data, focus, property.path.as_ref());
        let scope = Scope::Property {
            shape: property,
            focus,
            values: &values,
        };
        let source = Source {
            id: &property.id,
            path: Some(&property.path),
            severity: property.severity,
            message: property.message.as_deref(),
        };
        for family in ConstraintFamily::ALL {
            for failure in family.validate(&scope, eval, depth)? {
                results.push(source.result(focus, failure));
            }
        }
    }
    Ok(results)
}

/// The shape a failure is reported against.
struct Source<'s> {
    id: &'s ShapeId,
    path: Option<&'s NamedNode>,
    severity: Severity,
    message: Option<&'s str>,
}

impl Source<'_> {
    fn result(&self, focus: &Term, failure: Failure) -> ValidationResult {
        let mut details = BTreeMap::new();
        details.insert("component".to_string(), failure.component.to_string());
        if let Some(value) = &failure.value {
            details.insert("value".to_string(), value.to_string());
        }
        if let Some(shape) = &failure.shape {
            details.insert("shape".to_string(), shape.to_string());
        }
        let message = failure
            .declared_message
            .or_else(|| self.message.map(str::to_string))
            .unwrap_or(failure.message);
        ValidationResult {
            severity: self.severity,
            focus_node: focus.clone(),
            path: self.path.cloned(),
            source_shape: self.id.clone(),
            component: failure.component,
            value: failure.value,
            message: Some(message),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_graph;
    use crate::types::ConstraintComponent;
    use oxigraph::io::RdfFormat;
    use std::error::Error as StdError;

    const PREFIXES: &str = "@prefix ex: <http://example.org/> .\n\
                            @prefix sh: <http://www.w3.org/ns/shacl#> .\n\
                            @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n";

    fn turtle(body: &str) -> Graph {
        parse_graph(&format!("{}{}", PREFIXES, body), RdfFormat::Turtle, None)
            .expect("fixture parses")
    }

    fn check(data: &Graph, shapes: &Graph) -> Result<ValidationReport> {
        let options = ValidationOptions::sequential();
        run(data, &load_shapes(shapes, &options)?, &options)
    }

    #[test]
    fn results_carry_path_severity_and_message() -> std::result::Result<(), Box<dyn StdError>> {
        let shapes = turtle(
            "ex:PersonShape a sh:NodeShape ;
                sh:targetClass ex:Person ;
                sh:property [
                    sh:path ex:age ;
                    sh:datatype xsd:integer ;
                    sh:severity sh:Warning ;
                    sh:message \"age must be an integer\" ;
                ] .",
        );
        let data = turtle("ex:alice a ex:Person ; ex:age \"old\" .");
        let report = check(&data, &shapes)?;
        assert!(report.conforms());
        assert_eq!(report.results().len(), 1);
        let result = &report.results()[0];
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.component, ConstraintComponent::Datatype);
        assert_eq!(result.path.as_ref().map(|p| p.as_str()), Some("http://example.org/age"));
        assert_eq!(result.message.as_deref(), Some("age must be an integer"));
        assert_eq!(
            result.details.get("component").map(String::as_str),
            Some("sh:DatatypeConstraintComponent")
        );
        Ok(())
    }

    #[test]
    fn deactivated_shapes_are_skipped() -> std::result::Result<(), Box<dyn StdError>> {
        let shapes = turtle(
            "ex:S a sh:NodeShape ;
                sh:targetNode ex:a ;
                sh:deactivated true ;
                sh:property [ sh:path ex:p ; sh:minCount 1 ] .",
        );
        let report = check(&Graph::new(), &shapes)?;
        assert!(report.conforms());
        assert!(report.results().is_empty());
        Ok(())
    }

    #[test]
    fn target_nodes_are_deduplicated() -> std::result::Result<(), Box<dyn StdError>> {
        let shapes = turtle(
            "ex:S a sh:NodeShape ;
                sh:targetNode ex:a ;
                sh:targetClass ex:C ;
                sh:property [ sh:path ex:p ; sh:minCount 1 ] .",
        );
        let data = turtle("ex:a a ex:C .");
        let report = check(&data, &shapes)?;
        assert_eq!(report.results().len(), 1);
        Ok(())
    }

    #[test]
    fn panicking_task_yields_only_a_diagnostic() -> std::result::Result<(), Box<dyn StdError>> {
        let shapes = turtle(
            "ex:S a sh:NodeShape ;
                sh:targetNode ex:a ;
                sh:property [ sh:path ex:p ; sh:minCount 1 ] .",
        );
        let options = ValidationOptions::sequential();
        let shape_map = load_shapes(&shapes, &options)?;
        let data = Graph::new();
        let ctx = ValidationContext::new(&data, &shape_map, &options);
        let shape = shape_map.targeted().next().ok_or("no targeted shape")?;

        let (results, diagnostics) = guarded(&ctx, shape, |_, _| panic!("index out of bounds"));
        assert!(results.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::ShapeFailed {
                shape: shape.id.clone(),
                message: "index out of bounds".to_string(),
            }]
        );

        // the same shape run normally still reports its violation
        let (results, diagnostics) = run_task(&ctx, shape);
        assert_eq!(results.len(), 1);
        assert!(diagnostics.is_empty());
        Ok(())
    }

    #[test]
    fn panic_payloads_become_messages() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
