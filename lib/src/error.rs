//! Error taxonomy.
//!
//! Only hard failures are represented here: a malformed shapes graph, unreadable
//! input files, invalid options. Per-shape task failures and query failures are
//! absorbed during a run and surface as [`crate::report::Diagnostic`]s instead.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for whole-run operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two input graphs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Data,
    Shapes,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::Data => write!(f, "data"),
            GraphKind::Shapes => write!(f, "shapes"),
        }
    }
}

/// Errors raised while reading a shapes graph. Any of these aborts the parse.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("shape {shape} has unknown severity {severity}")]
    UnknownSeverity { shape: String, severity: String },

    #[error("invalid value for {predicate} on shape {shape}: {message}")]
    InvalidValue {
        shape: String,
        predicate: String,
        message: String,
    },

    #[error("property shape {shape} has no sh:path")]
    MissingPath { shape: String },

    #[error("property shape {shape} uses an unsupported path ({kind}); only a single predicate IRI is supported")]
    UnsupportedPath { shape: String, kind: String },

    #[error("invalid regex pattern '{pattern}' on shape {shape}: {message}")]
    InvalidPattern {
        shape: String,
        pattern: String,
        message: String,
    },

    #[error("list starting at {head} exceeds the maximum traversal depth of {max_depth}")]
    ListTooLong { head: String, max_depth: usize },

    #[error("malformed list starting at {head}: {message}")]
    MalformedList { head: String, message: String },

    #[error("shape {referrer} references {referenced}, which is not a shape in the shapes graph")]
    UnresolvedShape {
        referrer: String,
        referenced: String,
    },

    #[error("SPARQL constraint {constraint} on shape {shape} is invalid: {message}")]
    InvalidQuery {
        shape: String,
        constraint: String,
        message: String,
    },
}

/// Errors that end a validation run before a report is produced.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse shapes: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to read {kind} file {}: {source}", path.display())]
    FileRead {
        kind: GraphKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} graph is not valid RDF: {message}")]
    Syntax { kind: GraphKind, message: String },

    #[error("invalid validation options: {0}")]
    InvalidOptions(String),

    #[error("could not start worker pool: {0}")]
    ThreadPool(String),

    #[error("failed to serialize graph: {0}")]
    Serialize(String),
}
