use crate::error::Result;
use crate::graph;
use crate::io;
use crate::named_nodes::SHACL;
use crate::options::TextOptions;
use crate::types::{ConstraintComponent, Severity, ShapeId};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use std::collections::BTreeMap;
use std::fmt;

/// One failed constraint for one focus node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub severity: Severity,
    pub focus_node: Term,
    /// `None` for node-level results.
    pub path: Option<NamedNode>,
    pub source_shape: ShapeId,
    pub component: ConstraintComponent,
    /// The offending value node, when there is one.
    pub value: Option<Term>,
    pub message: Option<String>,
    /// Always holds `component`; holds `value` and `shape` when known.
    pub details: BTreeMap<String, String>,
}

impl ValidationResult {
    fn sort_key(&self) -> (String, String, String, ConstraintComponent, String) {
        (
            self.focus_node.to_string(),
            self.path.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            self.source_shape.to_string(),
            self.component,
            self.value.as_ref().map(|v| v.to_string()).unwrap_or_default(),
        )
    }
}

/// Soft failures absorbed during a run.
///
/// None of these affects `conforms`; they make degraded runs visible without
/// depending on logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A shape task ran out of time and contributed no results.
    ShapeTimedOut { shape: ShapeId, timeout_ms: u128 },
    /// A shape task panicked and contributed no results.
    ShapeFailed { shape: ShapeId, message: String },
    /// A SPARQL constraint could not be prepared or evaluated.
    QueryFailed {
        shape: ShapeId,
        constraint: Term,
        message: String,
    },
    /// A shape reference was not followed because the recursion limit was hit.
    RecursionLimit {
        shape: ShapeId,
        referenced: ShapeId,
        focus_node: Term,
        depth: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ShapeTimedOut { shape, timeout_ms } => {
                write!(f, "shape {} timed out after {} ms", shape, timeout_ms)
            }
            Diagnostic::ShapeFailed { shape, message } => {
                write!(f, "shape {} failed: {}", shape, message)
            }
            Diagnostic::QueryFailed {
                shape,
                constraint,
                message,
            } => write!(
                f,
                "SPARQL constraint {} on shape {} failed: {}",
                constraint, shape, message
            ),
            Diagnostic::RecursionLimit {
                shape,
                referenced,
                focus_node,
                depth,
            } => write!(
                f,
                "recursion limit {} reached in shape {} while checking {} against {}",
                depth, shape, focus_node, referenced
            ),
        }
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    conforms: bool,
    results: Vec<ValidationResult>,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Assembles a report. `conforms` holds iff no result is a `Violation`.
    pub fn new(results: Vec<ValidationResult>, diagnostics: Vec<Diagnostic>) -> Self {
        let conforms = !results.iter().any(|r| r.severity == Severity::Violation);
        ValidationReport {
            conforms,
            results,
            diagnostics,
        }
    }

    pub fn conforms(&self) -> bool {
        self.conforms
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn violations(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Violation)
    }

    /// The same report with results ordered by focus node, path, source
    /// shape, component and value.
    pub fn sorted(mut self) -> Self {
        self.results.sort_by_cached_key(ValidationResult::sort_key);
        self
    }

    /// Writes the report as a `sh:ValidationReport` graph.
    pub fn to_graph(&self) -> Graph {
        let sh = SHACL::new();
        let mut graph = Graph::new();
        let report: Subject = BlankNode::default().into();

        graph.insert(&Triple::new(report.clone(), rdf::TYPE, sh.validation_report.into_owned()));
        graph.insert(&Triple::new(
            report.clone(),
            sh.conforms,
            Literal::from(self.conforms),
        ));

        for result in &self.results {
            let node = BlankNode::default();
            let subject: Subject = node.clone().into();
            graph.insert(&Triple::new(report.clone(), sh.result, node));
            graph.insert(&Triple::new(subject.clone(), rdf::TYPE, sh.validation_result.into_owned()));
            graph.insert(&Triple::new(
                subject.clone(),
                sh.focus_node,
                result.focus_node.clone(),
            ));
            if let Some(path) = &result.path {
                graph.insert(&Triple::new(subject.clone(), sh.result_path, path.clone()));
            }
            graph.insert(&Triple::new(
                subject.clone(),
                sh.source_shape,
                graph::id_to_term(&result.source_shape),
            ));
            graph.insert(&Triple::new(
                subject.clone(),
                sh.result_severity,
                result.severity.iri().into_owned(),
            ));
            graph.insert(&Triple::new(
                subject.clone(),
                sh.source_constraint_component,
                result.component.iri(),
            ));
            if let Some(value) = &result.value {
                graph.insert(&Triple::new(subject.clone(), sh.value, value.clone()));
            }
            if let Some(message) = &result.message {
                graph.insert(&Triple::new(
                    subject,
                    sh.result_message,
                    Literal::new_simple_literal(message),
                ));
            }
        }
        graph
    }

    /// Serializes [`Self::to_graph`] with the given format and prefixes.
    pub fn to_text(&self, options: &TextOptions) -> Result<String> {
        io::write_graph(&self.to_graph(), options)
    }

    /// Reads `(conforms, result count)` back from a report graph.
    ///
    /// Returns `None` when the graph holds no `sh:ValidationReport` with a
    /// boolean `sh:conforms`.
    pub fn summarize(graph: &Graph) -> Option<(bool, usize)> {
        let sh = SHACL::new();
        let report = graph
            .subjects_for_predicate_object(rdf::TYPE, sh.validation_report)
            .next()?;
        let conforms = match graph.object_for_subject_predicate(report, sh.conforms)? {
            oxigraph::model::TermRef::Literal(lit) => match lit.value() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return None,
            },
            _ => return None,
        };
        let count = graph
            .objects_for_subject_predicate(report, sh.result)
            .count();
        Some((conforms, count))
    }

    /// A human-readable rendering grouped by focus node.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let violations = self.violations().count();
        out.push_str(&format!(
            "Conforms: {}\nResults: {} ({} violation(s))\n",
            self.conforms,
            self.results.len(),
            violations
        ));

        let mut by_focus: BTreeMap<String, Vec<&ValidationResult>> = BTreeMap::new();
        for result in &self.results {
            by_focus
                .entry(result.focus_node.to_string())
                .or_default()
                .push(result);
        }
        for (focus, results) in by_focus {
            out.push_str(&format!("\nFocus node: {}\n", focus));
            for result in results {
                let path = result
                    .path
                    .as_ref()
                    .map(|p| format!(" {}", graph::iri_label(p)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  [{}]{} {} ({}, shape {})\n",
                    result.severity,
                    path,
                    result.message.as_deref().unwrap_or(""),
                    result.component,
                    graph::id_label(&result.source_shape)
                ));
            }
        }

        if !self.diagnostics.is_empty() {
            out.push_str("\nDiagnostics:\n");
            for diagnostic in &self.diagnostics {
                out.push_str(&format!("  - {}\n", diagnostic));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::io::RdfFormat;
    use std::error::Error;

    fn result(severity: Severity, focus: &str, component: ConstraintComponent) -> ValidationResult {
        let mut details = BTreeMap::new();
        details.insert("component".to_string(), component.to_string());
        ValidationResult {
            severity,
            focus_node: Term::NamedNode(NamedNode::new_unchecked(format!(
                "http://example.org/{}",
                focus
            ))),
            path: Some(NamedNode::new_unchecked("http://example.org/name")),
            source_shape: ShapeId::BlankNode(BlankNode::default()),
            component,
            value: None,
            message: Some("missing name".to_string()),
            details,
        }
    }

    #[test]
    fn conforms_ignores_warnings() {
        let report = ValidationReport::new(
            vec![result(Severity::Warning, "a", ConstraintComponent::MinCount)],
            vec![],
        );
        assert!(report.conforms());
        let report = ValidationReport::new(
            vec![
                result(Severity::Info, "a", ConstraintComponent::MinCount),
                result(Severity::Violation, "b", ConstraintComponent::MaxCount),
            ],
            vec![],
        );
        assert!(!report.conforms());
        assert_eq!(report.violations().count(), 1);
    }

    #[test]
    fn graph_has_one_node_per_result() {
        let report = ValidationReport::new(
            vec![
                result(Severity::Violation, "a", ConstraintComponent::MinCount),
                result(Severity::Violation, "b", ConstraintComponent::Pattern),
            ],
            vec![],
        );
        let graph = report.to_graph();
        assert_eq!(ValidationReport::summarize(&graph), Some((false, 2)));
    }

    #[test]
    fn text_round_trip_keeps_summary() -> std::result::Result<(), Box<dyn Error>> {
        let report = ValidationReport::new(
            vec![result(Severity::Violation, "a", ConstraintComponent::MinCount)],
            vec![],
        );
        for format in [RdfFormat::Turtle, RdfFormat::NTriples, RdfFormat::RdfXml] {
            let text = report.to_text(&TextOptions::default().with_format(format))?;
            let graph = io::parse_graph(&text, format, None)?;
            assert_eq!(ValidationReport::summarize(&graph), Some((false, 1)));
        }
        Ok(())
    }

    #[test]
    fn empty_report_conforms() {
        let report = ValidationReport::new(vec![], vec![]);
        assert!(report.conforms());
        assert_eq!(
            ValidationReport::summarize(&report.to_graph()),
            Some((true, 0))
        );
        assert!(report.summary().starts_with("Conforms: true"));
    }

    #[test]
    fn sorted_orders_by_focus_node() {
        let report = ValidationReport::new(
            vec![
                result(Severity::Violation, "b", ConstraintComponent::MinCount),
                result(Severity::Violation, "a", ConstraintComponent::MinCount),
            ],
            vec![],
        )
        .sorted();
        assert!(report.results()[0].focus_node.to_string().ends_with("a>"));
    }

    #[test]
    fn summary_lists_diagnostics() {
        let report = ValidationReport::new(
            vec![],
            vec![Diagnostic::ShapeTimedOut {
                shape: ShapeId::NamedNode(NamedNode::new_unchecked("http://example.org/S")),
                timeout_ms: 10,
            }],
        );
        let text = report.summary();
        assert!(text.contains("Diagnostics:"));
        assert!(text.contains("timed out after 10 ms"));
    }
}
