//! Reads a shapes graph into [`NodeShape`]s.
//!
//! Top-level shapes are the subjects typed `sh:NodeShape` plus any subject
//! carrying a target declaration. Shapes that are only referenced (from
//! `sh:and`, `sh:or`, `sh:xone`, `sh:not`, `sh:node` or
//! `sh:qualifiedValueShape`) are discovered by repeated scanning until no new
//! ids appear, so inline blank-node shapes never need a separate declaration.

use crate::error::ParseError;
use crate::graph;
use crate::named_nodes::{RDFS_CLASS, SHACL};
use crate::shape::{Constraints, NodeShape, Pattern, PropertyShape, Qualified, SparqlConstraint};
use crate::types::{NodeKind, Severity, ShapeId};
use log::{debug, warn};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{Graph, Literal, NamedNode, NamedNodeRef, SubjectRef, Term, TripleRef};
use regex::Regex;
use std::collections::HashSet;

/// Parses every shape in `shapes_graph`, named and anonymous.
///
/// Lists are followed for at most `max_list_depth` members. Any malformed
/// field aborts the whole parse.
pub fn parse_shapes(shapes_graph: &Graph, max_list_depth: usize) -> Result<Vec<NodeShape>, ParseError> {
    ShapeReader::new(shapes_graph, max_list_depth).read_all()
}

struct ShapeReader<'a> {
    graph: &'a Graph,
    shacl: SHACL,
    max_list_depth: usize,
}

impl<'a> ShapeReader<'a> {
    fn new(graph: &'a Graph, max_list_depth: usize) -> Self {
        ShapeReader {
            graph,
            shacl: SHACL::new(),
            max_list_depth,
        }
    }

    fn read_all(&self) -> Result<Vec<NodeShape>, ParseError> {
        let mut shapes = Vec::new();
        let mut known: HashSet<ShapeId> = HashSet::new();
        let mut pending: Vec<(Option<ShapeId>, ShapeId)> =
            self.top_level_ids().into_iter().map(|id| (None, id)).collect();

        let mut round = 0;
        while !pending.is_empty() {
            round += 1;
            let batch = std::mem::take(&mut pending);
            debug!("shape discovery round {}: {} candidate(s)", round, batch.len());
            for (referrer, id) in batch {
                if known.contains(&id) {
                    continue;
                }
                if let Some(referrer) = &referrer {
                    if !self.describes(&id) {
                        return Err(ParseError::UnresolvedShape {
                            referrer: referrer.to_string(),
                            referenced: id.to_string(),
                        });
                    }
                }
                known.insert(id.clone());
                let shape = if self.is_property_shape(&id) {
                    self.read_standalone_property_shape(&id)?
                } else {
                    self.read_node_shape(&id)?
                };
                for (_, referenced) in shape.references() {
                    if !known.contains(referenced) {
                        pending.push((Some(id.clone()), referenced.clone()));
                    }
                }
                shapes.push(shape);
            }
        }
        debug!("parsed {} shape(s) in {} round(s)", shapes.len(), round);
        Ok(shapes)
    }

    fn top_level_ids(&self) -> Vec<ShapeId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let typed = self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, self.shacl.node_shape)
            .filter_map(subject_to_id);
        for id in typed {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        for predicate in [
            self.shacl.target_class,
            self.shacl.target_node,
            self.shacl.target_subjects_of,
            self.shacl.target_objects_of,
        ] {
            for triple in self.graph.triples_for_predicate(predicate) {
                let Some(id) = subject_to_id(triple.subject) else {
                    continue;
                };
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    fn describes(&self, id: &ShapeId) -> bool {
        self.graph
            .triples_for_subject(graph::id_as_subject(id))
            .next()
            .is_some()
    }

    fn objects(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        graph::values(self.graph, &graph::id_to_term(id), predicate)
    }

    fn first(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Option<Term> {
        graph::object(self.graph, graph::id_as_subject(id), predicate)
    }

    fn is_property_shape(&self, id: &ShapeId) -> bool {
        self.first(id, self.shacl.path).is_some()
            || self.graph.contains(TripleRef::new(
                graph::id_as_subject(id),
                rdf::TYPE,
                self.shacl.property_shape,
            ))
    }

    fn read_targets(&self, id: &ShapeId, shape: &mut NodeShape) -> Result<(), ParseError> {
        let sh = &self.shacl;
        shape.target_classes = self.objects(id, sh.target_class);
        shape.target_nodes = self.objects(id, sh.target_node);
        shape.target_subjects_of = self.iris(id, sh.target_subjects_of)?;
        shape.target_objects_of = self.iris(id, sh.target_objects_of)?;
        let subject = graph::id_as_subject(id);
        if self
            .graph
            .contains(TripleRef::new(subject, rdf::TYPE, RDFS_CLASS))
        {
            shape.implicit_class_target = Some(graph::id_to_term(id));
        }
        Ok(())
    }

    /// A property shape that is targeted or referenced on its own.
    ///
    /// It is wrapped in a node shape with no constraints of its own, so the
    /// property constraints run against each focus node and conformance
    /// checks see the property's results.
    fn read_standalone_property_shape(&self, id: &ShapeId) -> Result<NodeShape, ParseError> {
        let mut shape = NodeShape::new(id.clone());
        self.read_targets(id, &mut shape)?;
        let property = self.read_property_shape(id)?;
        shape.severity = property.severity;
        shape.deactivated = property.deactivated;
        shape.property_shapes.push(property);
        debug!(
            "read property shape {} on its own (targeted: {})",
            id,
            shape.has_targets()
        );
        Ok(shape)
    }

    fn read_node_shape(&self, id: &ShapeId) -> Result<NodeShape, ParseError> {
        let sh = &self.shacl;
        let mut shape = NodeShape::new(id.clone());
        self.read_targets(id, &mut shape)?;

        shape.severity = self.severity(id)?;
        shape.message = self.message(id);
        shape.deactivated = self.boolean(id, sh.deactivated)?;
        shape.constraints = self.constraints(id)?;

        shape.and = self.shape_list(id, sh.and)?;
        shape.or = self.shape_list(id, sh.or)?;
        shape.xone = self.shape_list(id, sh.xone)?;
        shape.not = match self.first(id, sh.not) {
            Some(term) => Some(self.shape_ref(id, sh.not, &term)?),
            None => None,
        };

        for term in self.objects(id, sh.property) {
            let property_id = graph::term_to_id(&term).ok_or_else(|| ParseError::InvalidValue {
                shape: id.to_string(),
                predicate: sh.property.to_string(),
                message: format!("{} is not a shape", term),
            })?;
            shape.property_shapes.push(self.read_property_shape(&property_id)?);
        }

        for term in self.objects(id, sh.sparql) {
            shape.sparql_constraints.push(self.sparql_constraint(id, &term)?);
        }

        debug!(
            "read shape {} ({} property shape(s), {} sparql constraint(s))",
            id,
            shape.property_shapes.len(),
            shape.sparql_constraints.len()
        );
        Ok(shape)
    }

    fn read_property_shape(&self, id: &ShapeId) -> Result<PropertyShape, ParseError> {
        let sh = &self.shacl;
        let path = self.path(id)?;
        let mut property = PropertyShape::new(id.clone(), path);
        property.constraints = self.constraints(id)?;
        property.min_count = self.count(id, sh.min_count)?;
        property.max_count = self.count(id, sh.max_count)?;
        property.message = self.message(id);
        property.severity = self.severity(id)?;
        property.deactivated = self.boolean(id, sh.deactivated)?;

        if let Some(term) = self.first(id, sh.qualified_value_shape) {
            property.qualified = Some(Qualified {
                shape: self.shape_ref(id, sh.qualified_value_shape, &term)?,
                min_count: self.count(id, sh.qualified_min_count)?,
                max_count: self.count(id, sh.qualified_max_count)?,
            });
        }
        Ok(property)
    }

    fn path(&self, id: &ShapeId) -> Result<NamedNode, ParseError> {
        let sh = &self.shacl;
        match self.first(id, sh.path) {
            None => Err(ParseError::MissingPath {
                shape: id.to_string(),
            }),
            Some(Term::NamedNode(nn)) => Ok(nn),
            Some(Term::BlankNode(bn)) => {
                let node = Term::BlankNode(bn);
                let has = |p: NamedNodeRef<'_>| !graph::values(self.graph, &node, p).is_empty();
                let kind = if has(sh.inverse_path) {
                    "inverse path"
                } else if has(sh.alternative_path) {
                    "alternative path"
                } else if has(sh.zero_or_more_path) {
                    "zero-or-more path"
                } else if has(sh.one_or_more_path) {
                    "one-or-more path"
                } else if has(sh.zero_or_one_path) {
                    "zero-or-one path"
                } else if has(rdf::FIRST) {
                    "sequence path"
                } else {
                    "blank node path"
                };
                Err(ParseError::UnsupportedPath {
                    shape: id.to_string(),
                    kind: kind.to_string(),
                })
            }
            Some(other) => Err(ParseError::InvalidValue {
                shape: id.to_string(),
                predicate: sh.path.to_string(),
                message: format!("{} is not a predicate", other),
            }),
        }
    }

    fn constraints(&self, id: &ShapeId) -> Result<Constraints, ParseError> {
        let sh = &self.shacl;
        let mut c = Constraints::default();

        if let Some(term) = self.first(id, sh.datatype) {
            match term {
                Term::NamedNode(nn) => c.datatype = Some(nn),
                other => return Err(self.invalid(id, sh.datatype, format!("{} is not an IRI", other))),
            }
        }
        c.class = self.objects(id, sh.class);
        if let Some(term) = self.first(id, sh.node_kind) {
            c.node_kind = Some(
                NodeKind::from_term(&term)
                    .ok_or_else(|| self.invalid(id, sh.node_kind, format!("unknown node kind {}", term)))?,
            );
        }

        c.min_inclusive = self.literal(id, sh.min_inclusive)?;
        c.min_exclusive = self.literal(id, sh.min_exclusive)?;
        c.max_inclusive = self.literal(id, sh.max_inclusive)?;
        c.max_exclusive = self.literal(id, sh.max_exclusive)?;
        c.min_length = self.count(id, sh.min_length)?;
        c.max_length = self.count(id, sh.max_length)?;

        if let Some(source) = self.literal(id, sh.pattern)? {
            let flags = self.literal(id, sh.flags)?.map(|l| l.value().to_string());
            c.pattern = Some(compile_pattern(id, source.value(), flags)?);
        }

        if self.first(id, sh.language_in).is_some() {
            let mut tags = Vec::new();
            for term in self.term_list(id, sh.language_in)? {
                match term {
                    Term::Literal(lit) => tags.push(lit.value().to_string()),
                    other => {
                        return Err(self.invalid(
                            id,
                            sh.language_in,
                            format!("{} is not a language tag", other),
                        ))
                    }
                }
            }
            c.language_in = Some(tags);
        }
        if self.first(id, sh.r#in).is_some() {
            c.in_values = Some(self.term_list(id, sh.r#in)?);
        }
        c.has_value = self.first(id, sh.has_value);

        for term in self.objects(id, sh.node) {
            c.node.push(self.shape_ref(id, sh.node, &term)?);
        }
        Ok(c)
    }

    fn sparql_constraint(&self, shape: &ShapeId, term: &Term) -> Result<SparqlConstraint, ParseError> {
        let sh = &self.shacl;
        let id = graph::term_to_id(term).ok_or_else(|| ParseError::InvalidQuery {
            shape: shape.to_string(),
            constraint: term.to_string(),
            message: "constraint must be an IRI or blank node".to_string(),
        })?;
        let select = match self.first(&id, sh.select) {
            Some(Term::Literal(lit)) => lit.value().to_string(),
            Some(other) => {
                return Err(ParseError::InvalidQuery {
                    shape: shape.to_string(),
                    constraint: term.to_string(),
                    message: format!("sh:select must be a string, found {}", other),
                })
            }
            None => {
                return Err(ParseError::InvalidQuery {
                    shape: shape.to_string(),
                    constraint: term.to_string(),
                    message: "missing sh:select".to_string(),
                })
            }
        };

        let mut declarations = Vec::new();
        for prefixes in self.objects(&id, sh.prefixes) {
            let Some(prefixes_id) = graph::term_to_id(&prefixes) else {
                continue;
            };
            for declare in self.objects(&prefixes_id, sh.declare) {
                let Some(declare_id) = graph::term_to_id(&declare) else {
                    continue;
                };
                let prefix = self.first(&declare_id, sh.prefix);
                let namespace = self.first(&declare_id, sh.namespace);
                if let (Some(Term::Literal(prefix)), Some(namespace)) = (prefix, namespace) {
                    let namespace = match namespace {
                        Term::Literal(lit) => lit.value().to_string(),
                        Term::NamedNode(nn) => nn.into_string(),
                        _ => continue,
                    };
                    let line = format!("PREFIX {}: <{}>\n", prefix.value(), namespace);
                    if !declarations.contains(&line) {
                        declarations.push(line);
                    }
                }
            }
        }

        let mut constraint = SparqlConstraint::new(term.clone(), format!("{}{}", declarations.concat(), select));
        constraint.message = self.message(&id);
        constraint.deactivated = self.boolean(&id, sh.deactivated)?;
        if let Err(message) = &constraint.prepared {
            warn!(
                "SPARQL constraint {} on shape {} cannot be run: {}",
                term, shape, message
            );
        }
        Ok(constraint)
    }

    fn invalid(&self, id: &ShapeId, predicate: NamedNodeRef<'_>, message: String) -> ParseError {
        ParseError::InvalidValue {
            shape: id.to_string(),
            predicate: predicate.to_string(),
            message,
        }
    }

    fn severity(&self, id: &ShapeId) -> Result<Severity, ParseError> {
        match self.first(id, self.shacl.severity) {
            None => Ok(Severity::default()),
            Some(term) => Severity::from_term(&term).ok_or_else(|| ParseError::UnknownSeverity {
                shape: id.to_string(),
                severity: term.to_string(),
            }),
        }
    }

    /// Picks the untagged message, then an English one, then any.
    fn message(&self, id: &ShapeId) -> Option<String> {
        let literals: Vec<Literal> = self
            .objects(id, self.shacl.message)
            .into_iter()
            .filter_map(|t| match t {
                Term::Literal(lit) => Some(lit),
                _ => None,
            })
            .collect();
        literals
            .iter()
            .find(|l| l.language().is_none())
            .or_else(|| literals.iter().find(|l| l.language() == Some("en")))
            .or_else(|| literals.first())
            .map(|l| l.value().to_string())
    }

    fn boolean(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Result<bool, ParseError> {
        match self.first(id, predicate) {
            None => Ok(false),
            Some(Term::Literal(lit)) => match lit.value() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(self.invalid(id, predicate, format!("'{}' is not a boolean", other))),
            },
            Some(other) => Err(self.invalid(id, predicate, format!("{} is not a boolean", other))),
        }
    }

    fn count(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Result<Option<u64>, ParseError> {
        match self.literal(id, predicate)? {
            None => Ok(None),
            Some(lit) => lit.value().trim().parse::<u64>().map(Some).map_err(|_| {
                self.invalid(
                    id,
                    predicate,
                    format!("'{}' is not a non-negative integer", lit.value()),
                )
            }),
        }
    }

    fn literal(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Result<Option<Literal>, ParseError> {
        match self.first(id, predicate) {
            None => Ok(None),
            Some(Term::Literal(lit)) => Ok(Some(lit)),
            Some(other) => Err(self.invalid(id, predicate, format!("{} is not a literal", other))),
        }
    }

    fn iris(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Result<Vec<NamedNode>, ParseError> {
        self.objects(id, predicate)
            .into_iter()
            .map(|term| match term {
                Term::NamedNode(nn) => Ok(nn),
                other => Err(self.invalid(id, predicate, format!("{} is not an IRI", other))),
            })
            .collect()
    }

    /// Values of `predicate`, where each value is either a single term or the
    /// head of an RDF list whose members are spliced in.
    fn term_list(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Result<Vec<Term>, ParseError> {
        let mut items = Vec::new();
        for term in self.objects(id, predicate) {
            if self.is_list(&term) {
                items.extend(graph::read_list(self.graph, &term, self.max_list_depth)?);
            } else {
                items.push(term);
            }
        }
        Ok(items)
    }

    fn shape_list(&self, id: &ShapeId, predicate: NamedNodeRef<'_>) -> Result<Vec<ShapeId>, ParseError> {
        self.term_list(id, predicate)?
            .iter()
            .map(|term| self.shape_ref(id, predicate, term))
            .collect()
    }

    fn shape_ref(&self, id: &ShapeId, predicate: NamedNodeRef<'_>, term: &Term) -> Result<ShapeId, ParseError> {
        graph::term_to_id(term)
            .ok_or_else(|| self.invalid(id, predicate, format!("{} cannot identify a shape", term)))
    }

    fn is_list(&self, term: &Term) -> bool {
        match term {
            Term::NamedNode(nn) if nn.as_ref() == rdf::NIL => true,
            Term::BlankNode(_) | Term::NamedNode(_) => {
                !graph::values(self.graph, term, rdf::FIRST).is_empty()
            }
            _ => false,
        }
    }
}

fn subject_to_id(subject: SubjectRef<'_>) -> Option<ShapeId> {
    match subject {
        SubjectRef::NamedNode(nn) => Some(ShapeId::NamedNode(nn.into_owned())),
        SubjectRef::BlankNode(bn) => Some(ShapeId::BlankNode(bn.into_owned())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Compiles `sh:pattern` with its `sh:flags` into a regex.
///
/// `i`, `m`, `s` and `x` become inline flags; `q` matches the pattern literally.
fn compile_pattern(id: &ShapeId, source: &str, flags: Option<String>) -> Result<Pattern, ParseError> {
    let mut inline = String::new();
    let mut quoted = false;
    for flag in flags.as_deref().unwrap_or("").chars() {
        match flag {
            'i' | 'm' | 's' | 'x' => {
                if !inline.contains(flag) {
                    inline.push(flag);
                }
            }
            'q' => quoted = true,
            other => {
                return Err(ParseError::InvalidPattern {
                    shape: id.to_string(),
                    pattern: source.to_string(),
                    message: format!("unsupported flag '{}'", other),
                })
            }
        }
    }
    let body = if quoted {
        regex::escape(source)
    } else {
        source.to_string()
    };
    let text = if inline.is_empty() {
        body
    } else {
        format!("(?{}){}", inline, body)
    };
    let regex = Regex::new(&text).map_err(|e| ParseError::InvalidPattern {
        shape: id.to_string(),
        pattern: source.to_string(),
        message: e.to_string(),
    })?;
    Ok(Pattern::new(regex, source.to_string(), flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_graph;
    use oxigraph::io::RdfFormat;
    use std::error::Error;

    const PREFIXES: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
        @prefix ex: <http://example.org/> .\n\
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n";

    fn shapes(body: &str) -> Result<Vec<NodeShape>, ParseError> {
        let graph = parse_graph(&format!("{}{}", PREFIXES, body), RdfFormat::Turtle, None)
            .expect("fixture parses");
        parse_shapes(&graph, 100)
    }

    fn ex(local: &str) -> ShapeId {
        ShapeId::NamedNode(NamedNode::new_unchecked(format!("http://example.org/{}", local)))
    }

    fn find<'a>(shapes: &'a [NodeShape], id: &ShapeId) -> &'a NodeShape {
        shapes.iter().find(|s| &s.id == id).expect("shape present")
    }

    #[test]
    fn reads_targets_and_property_shapes() -> Result<(), Box<dyn Error>> {
        let parsed = shapes(
            "ex:PersonShape a sh:NodeShape ;
                sh:targetClass ex:Person ;
                sh:targetNode ex:alice ;
                sh:property [ sh:path ex:name ; sh:minCount 1 ; sh:maxCount 2 ; sh:datatype xsd:string ] .",
        )?;
        assert_eq!(parsed.len(), 1);
        let shape = &parsed[0];
        assert_eq!(shape.target_classes.len(), 1);
        assert_eq!(shape.target_nodes.len(), 1);
        let prop = &shape.property_shapes[0];
        assert_eq!(prop.path.as_str(), "http://example.org/name");
        assert_eq!(prop.min_count, Some(1));
        assert_eq!(prop.max_count, Some(2));
        assert!(prop.constraints.datatype.is_some());
        Ok(())
    }

    #[test]
    fn untyped_shapes_with_targets_are_top_level() -> Result<(), Box<dyn Error>> {
        let parsed = shapes("ex:S sh:targetSubjectsOf ex:knows ; sh:nodeKind sh:IRI .")?;
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].target_subjects_of.len(), 1);
        assert_eq!(parsed[0].constraints.node_kind, Some(NodeKind::Iri));
        Ok(())
    }

    #[test]
    fn anonymous_shapes_are_discovered_transitively() -> Result<(), Box<dyn Error>> {
        let parsed = shapes(
            "ex:S a sh:NodeShape ;
                sh:and ( [ sh:or ( [ sh:nodeKind sh:IRI ] ex:Named ) ] ) .
             ex:Named sh:class ex:Thing .",
        )?;
        // ex:S, the and-member, the two or-members
        assert_eq!(parsed.len(), 4);
        let outer = find(&parsed, &ex("S"));
        assert_eq!(outer.and.len(), 1);
        let inner = find(&parsed, &outer.and[0]);
        assert_eq!(inner.or.len(), 2);
        assert!(inner.or.contains(&ex("Named")));
        Ok(())
    }

    #[test]
    fn xone_keeps_duplicate_slots() -> Result<(), Box<dyn Error>> {
        let parsed = shapes(
            "ex:X a sh:NodeShape ; sh:xone ( ex:A ex:A ) .
             ex:A a sh:NodeShape ; sh:minLength 1 .",
        )?;
        assert_eq!(find(&parsed, &ex("X")).xone, vec![ex("A"), ex("A")]);
        Ok(())
    }

    #[test]
    fn unresolved_reference_is_an_error() {
        let err = shapes("ex:S a sh:NodeShape ; sh:not ex:Missing .");
        assert!(matches!(err, Err(ParseError::UnresolvedShape { .. })));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = shapes("ex:S a sh:NodeShape ; sh:pattern \"[a-z\" .");
        assert!(matches!(err, Err(ParseError::InvalidPattern { .. })));
    }

    #[test]
    fn pattern_flags_are_compiled() -> Result<(), Box<dyn Error>> {
        let parsed = shapes("ex:S a sh:NodeShape ; sh:pattern \"^abc$\" ; sh:flags \"i\" .")?;
        let pattern = parsed[0].constraints.pattern.as_ref().expect("pattern");
        assert!(pattern.is_match("ABC"));
        assert_eq!(pattern.flags(), Some("i"));

        let err = shapes("ex:S a sh:NodeShape ; sh:pattern \"a\" ; sh:flags \"z\" .");
        assert!(matches!(err, Err(ParseError::InvalidPattern { .. })));
        Ok(())
    }

    #[test]
    fn implicit_class_target() -> Result<(), Box<dyn Error>> {
        let parsed = shapes("ex:Person a sh:NodeShape, rdfs:Class .")?;
        assert_eq!(
            parsed[0].implicit_class_target,
            Some(graph::id_to_term(&ex("Person")))
        );
        Ok(())
    }

    #[test]
    fn referenced_property_shapes_keep_their_path() -> Result<(), Box<dyn Error>> {
        let parsed = shapes(
            "ex:S a sh:NodeShape ;
                sh:or ( [ sh:path ex:p ; sh:minCount 1 ] ex:Q ) .
             ex:Q a sh:PropertyShape ; sh:path ex:q ; sh:maxCount 2 .",
        )?;
        assert_eq!(parsed.len(), 3);
        let outer = find(&parsed, &ex("S"));
        let member = find(&parsed, &outer.or[0]);
        assert_eq!(member.property_shapes.len(), 1);
        assert_eq!(member.property_shapes[0].path.as_str(), "http://example.org/p");
        assert_eq!(member.property_shapes[0].min_count, Some(1));
        assert!(member.constraints.class.is_empty());
        let named = find(&parsed, &ex("Q"));
        assert_eq!(named.property_shapes[0].max_count, Some(2));

        let err = shapes("ex:S a sh:NodeShape ; sh:not ex:P .\nex:P a sh:PropertyShape ; sh:minCount 1 .");
        assert!(matches!(err, Err(ParseError::MissingPath { .. })));
        Ok(())
    }

    #[test]
    fn targeted_property_shapes_are_top_level() -> Result<(), Box<dyn Error>> {
        let parsed = shapes("ex:P sh:targetClass ex:Person ; sh:path ex:name ; sh:minCount 1 .")?;
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].has_targets());
        assert_eq!(parsed[0].property_shapes[0].min_count, Some(1));
        Ok(())
    }

    #[test]
    fn complex_paths_are_rejected() {
        let err = shapes("ex:S a sh:NodeShape ; sh:property [ sh:path [ sh:inversePath ex:p ] ] .");
        assert!(matches!(
            err,
            Err(ParseError::UnsupportedPath { ref kind, .. }) if kind == "inverse path"
        ));
        let err = shapes("ex:S a sh:NodeShape ; sh:property [ sh:minCount 1 ] .");
        assert!(matches!(err, Err(ParseError::MissingPath { .. })));
    }

    #[test]
    fn unknown_severity_is_an_error() {
        let err = shapes("ex:S a sh:NodeShape ; sh:severity ex:Catastrophic .");
        assert!(matches!(err, Err(ParseError::UnknownSeverity { .. })));
    }

    #[test]
    fn value_lists_and_single_values() -> Result<(), Box<dyn Error>> {
        let parsed = shapes(
            "ex:S a sh:NodeShape ;
                sh:in ( ex:a ex:b 3 ) ;
                sh:languageIn ( \"en\" \"fr\" ) ;
                sh:severity sh:Warning ;
                sh:deactivated true .",
        )?;
        let shape = &parsed[0];
        assert_eq!(shape.constraints.in_values.as_ref().map(Vec::len), Some(3));
        assert_eq!(
            shape.constraints.language_in,
            Some(vec!["en".to_string(), "fr".to_string()])
        );
        assert_eq!(shape.severity, Severity::Warning);
        assert!(shape.deactivated);
        Ok(())
    }

    #[test]
    fn long_lists_abort_the_parse() {
        let graph = parse_graph(
            &format!("{}ex:S a sh:NodeShape ; sh:in (1 2 3 4 5) .", PREFIXES),
            RdfFormat::Turtle,
            None,
        )
        .expect("fixture parses");
        assert!(matches!(
            parse_shapes(&graph, 3),
            Err(ParseError::ListTooLong { max_depth: 3, .. })
        ));
    }

    #[test]
    fn sparql_prefixes_are_prepended() -> Result<(), Box<dyn Error>> {
        let parsed = shapes(
            "ex:S a sh:NodeShape ;
                sh:sparql [
                    sh:prefixes ex:decls ;
                    sh:message \"bad {?value}\" ;
                    sh:select \"SELECT $this WHERE { $this ex:p ?value }\"
                ] .
             ex:decls sh:declare [ sh:prefix \"ex\" ; sh:namespace \"http://example.org/\"^^xsd:anyURI ] .",
        )?;
        let constraint = &parsed[0].sparql_constraints[0];
        assert!(constraint.query.starts_with("PREFIX ex: <http://example.org/>\n"));
        assert_eq!(constraint.message.as_deref(), Some("bad {?value}"));

        let err = shapes("ex:S a sh:NodeShape ; sh:sparql [ sh:message \"x\" ] .");
        assert!(matches!(err, Err(ParseError::InvalidQuery { .. })));
        Ok(())
    }
}
