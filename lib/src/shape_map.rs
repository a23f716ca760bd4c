use crate::error::ParseError;
use crate::graph;
use crate::shape::{NodeShape, ReferenceKind};
use crate::types::ShapeId;
use log::{debug, warn};
use petgraph::algo::tarjan_scc;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Id-indexed lookup of every parsed shape, named and anonymous.
///
/// Shapes live in one arena and refer to each other by id only, so cyclic
/// references need no special representation.
#[derive(Debug)]
pub struct ShapeMap {
    shapes: Vec<NodeShape>,
    index: HashMap<ShapeId, usize>,
    references: DiGraph<String, ReferenceKind>,
    cycles: Vec<Vec<ShapeId>>,
}

impl ShapeMap {
    /// Indexes `shapes` and checks that every shape reference resolves.
    pub fn build(shapes: Vec<NodeShape>) -> Result<ShapeMap, ParseError> {
        let mut index = HashMap::with_capacity(shapes.len());
        let mut unique = Vec::with_capacity(shapes.len());
        for shape in shapes {
            if index.contains_key(&shape.id) {
                warn!("shape {} is declared more than once; keeping the first", shape.id);
                continue;
            }
            index.insert(shape.id.clone(), unique.len());
            unique.push(shape);
        }

        let mut references = DiGraph::with_capacity(unique.len(), 0);
        let nodes: Vec<NodeIndex> = unique
            .iter()
            .map(|s| references.add_node(graph::id_label(&s.id)))
            .collect();
        for (from, shape) in unique.iter().enumerate() {
            for (kind, referenced) in shape.references() {
                let to = index
                    .get(referenced)
                    .ok_or_else(|| ParseError::UnresolvedShape {
                        referrer: shape.id.to_string(),
                        referenced: referenced.to_string(),
                    })?;
                references.add_edge(nodes[from], nodes[*to], kind);
            }
        }

        let cycles: Vec<Vec<ShapeId>> = tarjan_scc(&references)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || references
                        .find_edge(component[0], component[0])
                        .is_some()
            })
            .map(|component| {
                component
                    .into_iter()
                    .map(|node| unique[node.index()].id.clone())
                    .collect()
            })
            .collect();
        for cycle in &cycles {
            let labels: Vec<String> = cycle.iter().map(graph::id_label).collect();
            warn!(
                "shapes reference each other cyclically: {}; recursion is bounded by the depth limit",
                labels.join(" -> ")
            );
        }
        debug!("shape map holds {} shape(s)", unique.len());

        Ok(ShapeMap {
            shapes: unique,
            index,
            references,
            cycles,
        })
    }

    pub fn get(&self, id: &ShapeId) -> Option<&NodeShape> {
        self.index.get(id).map(|i| &self.shapes[*i])
    }

    /// Shapes with at least one target declaration, in parse order.
    pub fn targeted(&self) -> impl Iterator<Item = &NodeShape> {
        self.shapes.iter().filter(|s| s.has_targets())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Groups of shapes that can reach each other through references.
    pub fn cyclic_shapes(&self) -> &[Vec<ShapeId>] {
        &self.cycles
    }

    /// Renders the shape reference graph in Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let labelled = self.references.map(|_, node| node.clone(), |_, kind| kind.label());
        format!("{}", Dot::new(&labelled)).replacen("digraph {", "digraph shapes {", 1)
    }
}
