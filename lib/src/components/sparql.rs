use super::{Failure, Scope};
use crate::context::Evaluation;
use crate::graph;
use crate::report::Diagnostic;
use crate::shape::SparqlConstraint;
use crate::types::ConstraintComponent;
use log::error;
use oxigraph::model::Term;
use oxigraph::sparql::{Query, QueryOptions, QueryResults, Variable};
use spargebra::algebra::{AggregateExpression, Expression, GraphPattern, OrderExpression};
use spargebra::Query as AlgebraQuery;

/// `sh:sparql` constraints of a node shape.
///
/// Every solution of the SELECT query, with `$this` bound to the focus node,
/// is one failure. A query that cannot be prepared or run is recorded as a
/// diagnostic and yields no failures.
pub(crate) fn validate(scope: &Scope<'_>, eval: &mut Evaluation<'_, '_>) -> Vec<Failure> {
    let Scope::Node { shape, focus } = *scope else {
        return Vec::new();
    };
    let mut failures = Vec::new();
    for constraint in shape.sparql_constraints.iter().filter(|c| !c.deactivated) {
        match evaluate(constraint, focus, eval) {
            Ok(mut found) => failures.append(&mut found),
            Err(message) => {
                error!(
                    "SPARQL constraint {} on shape {} failed: {}",
                    graph::term_label(&constraint.id),
                    graph::id_label(&shape.id),
                    message
                );
                eval.record(Diagnostic::QueryFailed {
                    shape: shape.id.clone(),
                    constraint: constraint.id.clone(),
                    message,
                });
            }
        }
    }
    failures
}

fn evaluate(
    constraint: &SparqlConstraint,
    focus: &Term,
    eval: &Evaluation<'_, '_>,
) -> Result<Vec<Failure>, String> {
    let query = constraint.prepared.as_ref().map_err(Clone::clone)?;
    let store = eval.ctx.store()?;
    let results = store
        .query_opt_with_substituted_variables(
            query.clone(),
            QueryOptions::default(),
            [(Variable::new_unchecked("this"), focus.clone())],
        )
        .map_err(|e| e.to_string())?;
    let QueryResults::Solutions(solutions) = results else {
        return Err("query did not produce solutions".to_string());
    };

    let mut failures = Vec::new();
    for solution in solutions {
        let solution = solution.map_err(|e| e.to_string())?;
        let value = solution.get("value").cloned().unwrap_or_else(|| focus.clone());
        let mut failure = Failure::new(
            ConstraintComponent::Sparql,
            Some(&value),
            format!(
                "Node {} violates SPARQL constraint {}",
                graph::term_label(focus),
                graph::term_label(&constraint.id)
            ),
        );
        if let Some(template) = &constraint.message {
            let mut message = template.clone();
            for (variable, term) in solution.iter() {
                let text = match term {
                    Term::Literal(lit) => lit.value().to_string(),
                    other => other.to_string(),
                };
                message = message
                    .replace(&format!("{{?{}}}", variable.as_str()), &text)
                    .replace(&format!("{{${}}}", variable.as_str()), &text);
            }
            message = message
                .replace("{$this}", &focus.to_string())
                .replace("{?this}", &focus.to_string());
            failure.declared_message = Some(message);
        }
        failures.push(failure);
    }
    Ok(failures)
}

/// Checks and parses a constraint query once, when its shape is read.
pub(crate) fn prepare_query(text: &str) -> Result<Query, String> {
    check_query(text)?;
    Query::parse(text, None).map_err(|e| e.to_string())
}

/// Rejects queries that cannot take a pre-bound `$this`: anything but SELECT,
/// and any use of `VALUES`, `MINUS` or `SERVICE`.
pub(crate) fn check_query(text: &str) -> Result<(), String> {
    let query = AlgebraQuery::parse(text, None).map_err(|e| e.to_string())?;
    match &query {
        AlgebraQuery::Select { pattern, .. } => check_graph_pattern(pattern),
        _ => Err("only SELECT queries are supported".to_string()),
    }
}

fn check_graph_pattern(pattern: &GraphPattern) -> Result<(), String> {
    match pattern {
        GraphPattern::Bgp { .. } | GraphPattern::Path { .. } => Ok(()),
        GraphPattern::Join { left, right }
        | GraphPattern::Union { left, right }
        | GraphPattern::Lateral { left, right } => {
            check_graph_pattern(left)?;
            check_graph_pattern(right)
        }
        GraphPattern::Graph { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Project { inner, .. } => check_graph_pattern(inner),
        GraphPattern::Filter { expr, inner } => {
            check_expression(expr)?;
            check_graph_pattern(inner)
        }
        GraphPattern::LeftJoin {
            left,
            right,
            expression,
        } => {
            check_graph_pattern(left)?;
            check_graph_pattern(right)?;
            expression.as_ref().map_or(Ok(()), check_expression)
        }
        GraphPattern::Extend {
            inner, expression, ..
        } => {
            check_expression(expression)?;
            check_graph_pattern(inner)
        }
        GraphPattern::Group {
            inner, aggregates, ..
        } => {
            for (_, aggregate) in aggregates {
                if let AggregateExpression::FunctionCall { expr, .. } = aggregate {
                    check_expression(expr)?;
                }
            }
            check_graph_pattern(inner)
        }
        GraphPattern::OrderBy { inner, expression } => {
            for order in expression {
                match order {
                    OrderExpression::Asc(expr) | OrderExpression::Desc(expr) => {
                        check_expression(expr)?
                    }
                }
            }
            check_graph_pattern(inner)
        }
        GraphPattern::Values { .. } => Err("must not contain a VALUES clause".to_string()),
        GraphPattern::Minus { .. } => Err("must not contain a MINUS clause".to_string()),
        GraphPattern::Service { .. } => {
            Err("must not contain a federated query (SERVICE)".to_string())
        }
    }
}

fn check_expression(expr: &Expression) -> Result<(), String> {
    match expr {
        Expression::NamedNode(_)
        | Expression::Literal(_)
        | Expression::Variable(_)
        | Expression::Bound(_) => Ok(()),
        Expression::UnaryPlus(inner) | Expression::UnaryMinus(inner) | Expression::Not(inner) => {
            check_expression(inner)
        }
        Expression::Or(left, right)
        | Expression::And(left, right)
        | Expression::Equal(left, right)
        | Expression::SameTerm(left, right)
        | Expression::Greater(left, right)
        | Expression::GreaterOrEqual(left, right)
        | Expression::Less(left, right)
        | Expression::LessOrEqual(left, right)
        | Expression::Add(left, right)
        | Expression::Subtract(left, right)
        | Expression::Multiply(left, right)
        | Expression::Divide(left, right) => {
            check_expression(left)?;
            check_expression(right)
        }
        Expression::In(item, items) => {
            check_expression(item)?;
            items.iter().try_for_each(check_expression)
        }
        Expression::FunctionCall(_, args) | Expression::Coalesce(args) => {
            args.iter().try_for_each(check_expression)
        }
        Expression::If(condition, then_branch, else_branch) => {
            check_expression(condition)?;
            check_expression(then_branch)?;
            check_expression(else_branch)
        }
        Expression::Exists(pattern) => check_graph_pattern(pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_queries_pass_the_check() {
        let query = "SELECT $this ?value WHERE { $this <http://example.org/p> ?value . \
                     FILTER NOT EXISTS { ?value a <http://example.org/C> } }";
        assert!(check_query(query).is_ok());
    }

    #[test]
    fn prebinding_restrictions_are_enforced() {
        let ask = "ASK { $this ?p ?o }";
        assert!(check_query(ask).is_err());
        let values = "SELECT $this WHERE { VALUES ?x { 1 2 } $this ?p ?x }";
        assert!(check_query(values).unwrap_err().contains("VALUES"));
        let minus = "SELECT $this WHERE { $this ?p ?o MINUS { $this a ?o } }";
        assert!(check_query(minus).unwrap_err().contains("MINUS"));
        let nested = "SELECT $this WHERE { $this ?p ?o FILTER EXISTS { MINUS { ?o ?q ?r } } }";
        assert!(check_query(nested).is_err());
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(check_query("SELECT WHERE {").is_err());
    }

    #[test]
    fn constraints_are_prepared_once_on_creation() {
        let id = Term::NamedNode(oxigraph::model::NamedNode::new_unchecked("http://example.org/c"));
        let good = SparqlConstraint::new(id.clone(), "SELECT $this WHERE { $this ?p ?o }".to_string());
        assert!(good.is_prepared());
        let refused = SparqlConstraint::new(id, "SELECT $this WHERE { VALUES ?x { 1 } }".to_string());
        assert!(refused.prepared.as_ref().unwrap_err().contains("VALUES"));
    }
}
