//! Evaluation state.
//!
//! [`ValidationContext`] is shared read-only by every shape task of a run.
//! [`Evaluation`] belongs to a single task: it owns the task deadline and the
//! diagnostics the task has recorded so far.

use crate::graph;
use crate::options::ValidationOptions;
use crate::report::Diagnostic;
use crate::shape_map::ShapeMap;
use crate::types::{Severity, ShapeId};
use crate::validate::validate_node;
use log::{debug, error};
use oxigraph::model::{Graph, GraphNameRef, Term};
use oxigraph::store::Store;
use std::sync::OnceLock;
use std::time::Instant;

/// Everything a run reads: the data graph, the shape map and the options.
pub(crate) struct ValidationContext<'a> {
    pub data: &'a Graph,
    pub shapes: &'a ShapeMap,
    pub options: &'a ValidationOptions,
    store: OnceLock<Result<Store, String>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(data: &'a Graph, shapes: &'a ShapeMap, options: &'a ValidationOptions) -> Self {
        ValidationContext {
            data,
            shapes,
            options,
            store: OnceLock::new(),
        }
    }

    /// The data graph loaded into a query store. Built on first use.
    pub fn store(&self) -> Result<&Store, String> {
        self.store
            .get_or_init(|| {
                debug!("loading {} data triple(s) into the query store", self.data.len());
                let store = Store::new().map_err(|e| e.to_string())?;
                store
                    .extend(
                        self.data
                            .iter()
                            .map(|t| t.in_graph(GraphNameRef::DefaultGraph).into_owned()),
                    )
                    .map_err(|e| e.to_string())?;
                Ok(store)
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// The task ran past its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimedOut;

/// Outcome of checking a node against a referenced shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conformance {
    Conforms,
    Fails,
    /// The recursion limit was reached before an answer was known.
    Unknown,
}

/// Per-task evaluation state.
pub(crate) struct Evaluation<'c, 'a> {
    pub ctx: &'c ValidationContext<'a>,
    /// The top-level shape this task validates.
    pub shape: ShapeId,
    deadline: Instant,
    diagnostics: Vec<Diagnostic>,
}

impl<'c, 'a> Evaluation<'c, 'a> {
    pub fn new(ctx: &'c ValidationContext<'a>, shape: ShapeId) -> Self {
        Evaluation {
            deadline: Instant::now() + ctx.options.timeout,
            ctx,
            shape,
            diagnostics: Vec::new(),
        }
    }

    pub fn check_deadline(&self) -> Result<(), TimedOut> {
        if Instant::now() >= self.deadline {
            Err(TimedOut)
        } else {
            Ok(())
        }
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Checks `focus` against the shape `id` by validating it in full.
    ///
    /// A node conforms when validation yields no `Violation`. `depth` is the
    /// depth of the caller; the referenced shape is evaluated one level below.
    pub fn conforms(&mut self, focus: &Term, id: &ShapeId, depth: usize) -> Result<Conformance, TimedOut> {
        self.check_deadline()?;
        let limit = self.ctx.options.max_recursion_depth;
        if depth >= limit {
            error!(
                "recursion limit {} reached while checking {} against {} (from {}); treating the branch as passing",
                limit,
                graph::term_label(focus),
                graph::id_label(id),
                graph::id_label(&self.shape)
            );
            self.record(Diagnostic::RecursionLimit {
                shape: self.shape.clone(),
                referenced: id.clone(),
                focus_node: focus.clone(),
                depth: limit,
            });
            return Ok(Conformance::Unknown);
        }
        let Some(shape) = self.ctx.shapes.get(id) else {
            return Ok(Conformance::Unknown);
        };
        let results = validate_node(self, shape, focus, depth + 1)?;
        if results.iter().any(|r| r.severity == Severity::Violation) {
            Ok(Conformance::Fails)
        } else {
            Ok(Conformance::Conforms)
        }
    }
}
