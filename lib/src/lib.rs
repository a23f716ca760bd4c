//! A graph shape-constraint validator modeled on W3C SHACL.
//!
//! Shapes are read from a shapes graph, indexed into a [`ShapeMap`], and
//! applied to the target nodes of a data graph. The outcome is a
//! [`ValidationReport`] that can be inspected directly or written back out as
//! a `sh:ValidationReport` graph.
//!
//! ```no_run
//! use shapecheck::{validate_file, ValidationOptions};
//!
//! let report = validate_file("data.ttl", "shapes.ttl", &ValidationOptions::default())?;
//! println!("conforms: {}", report.conforms());
//! # Ok::<(), shapecheck::Error>(())
//! ```
#![deny(clippy::all)]

// Publicly visible items
pub mod error;
pub mod io;
pub mod options;
pub mod report;
pub mod shape;
pub mod shape_map;
pub mod types;

pub use error::{Error, GraphKind, ParseError, Result};
pub use options::{TextOptions, ValidationOptions};
pub use report::{Diagnostic, ValidationReport, ValidationResult};
pub use shape_map::ShapeMap;
pub use types::{ConstraintComponent, NodeKind, Severity, ShapeId, Target};

// Internal modules.
pub(crate) mod components;
pub(crate) mod context;
pub(crate) mod graph;
pub(crate) mod named_nodes;
pub(crate) mod parser;
pub(crate) mod validate;

pub use parser::parse_shapes;

use log::info;
use oxigraph::model::Graph;
use std::path::Path;

/// Parsed shapes together with the options they are applied with.
///
/// Parsing happens once; the same validator can then check any number of
/// data graphs.
#[derive(Debug)]
pub struct Validator {
    shapes: ShapeMap,
    options: ValidationOptions,
}

impl Validator {
    /// Reads the shapes of `shapes_graph`.
    pub fn new(shapes_graph: &Graph, options: ValidationOptions) -> Result<Self> {
        options.check()?;
        let shapes = validate::load_shapes(shapes_graph, &options)?;
        Ok(Validator { shapes, options })
    }

    /// Reads the shapes graph at `path`; the format follows the extension.
    pub fn from_file(path: impl AsRef<Path>, options: ValidationOptions) -> Result<Self> {
        let path = path.as_ref();
        let shapes_graph = io::read_graph_file(GraphKind::Shapes, path)?;
        info!(
            "loaded {} shape triple(s) from {}",
            shapes_graph.len(),
            path.display()
        );
        Self::new(&shapes_graph, options)
    }

    pub fn shapes(&self) -> &ShapeMap {
        &self.shapes
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validates `data` against every targeted shape.
    pub fn validate(&self, data: &Graph) -> Result<ValidationReport> {
        validate::run(data, &self.shapes, &self.options)
    }

    /// The shape reference graph in Graphviz DOT.
    pub fn to_graphviz(&self) -> String {
        self.shapes.to_dot()
    }
}

/// Validates `data` against the shapes of `shapes`.
pub fn validate(data: &Graph, shapes: &Graph, options: &ValidationOptions) -> Result<ValidationReport> {
    Validator::new(shapes, options.clone())?.validate(data)
}

/// Reads both graphs from disk and validates them.
///
/// Read and syntax failures name the graph they belong to, see [`GraphKind`].
pub fn validate_file(
    data_path: impl AsRef<Path>,
    shapes_path: impl AsRef<Path>,
    options: &ValidationOptions,
) -> Result<ValidationReport> {
    let data_path = data_path.as_ref();
    let data = io::read_graph_file(GraphKind::Data, data_path)?;
    info!(
        "loaded {} data triple(s) from {}",
        data.len(),
        data_path.display()
    );
    Validator::from_file(shapes_path, options.clone())?.validate(&data)
}
