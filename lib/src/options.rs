use crate::error::{Error, Result};
use oxigraph::io::RdfFormat;
use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_MAX_RECURSION_DEPTH: usize = 50;
const DEFAULT_MAX_LIST_DEPTH: usize = 100;

/// Knobs for a single validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Dispatch shapes to a worker pool instead of validating them in order.
    pub parallel: bool,
    /// Upper bound on concurrently running shape tasks.
    pub max_concurrency: usize,
    /// Budget for one shape's validation across all of its target nodes.
    pub timeout: Duration,
    /// Nesting limit for logical operators, `sh:node` and qualified shapes.
    pub max_recursion_depth: usize,
    /// Longest RDF list the shape reader will follow.
    pub max_list_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            parallel: true,
            max_concurrency: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_list_depth: DEFAULT_MAX_LIST_DEPTH,
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for deterministic, single-threaded runs.
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_max_list_depth(mut self, depth: usize) -> Self {
        self.max_list_depth = depth;
        self
    }

    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::InvalidOptions(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidOptions(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// How reports and graphs are rendered as text.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub format: RdfFormat,
    /// `(prefix, namespace)` pairs declared in the output.
    pub prefixes: Vec<(String, String)>,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            format: RdfFormat::Turtle,
            prefixes: vec![
                ("sh".to_string(), "http://www.w3.org/ns/shacl#".to_string()),
                (
                    "rdf".to_string(),
                    "http://www.w3.org/1999/02/22-rdf-syntax-ns#".to_string(),
                ),
                (
                    "rdfs".to_string(),
                    "http://www.w3.org/2000/01/rdf-schema#".to_string(),
                ),
                (
                    "xsd".to_string(),
                    "http://www.w3.org/2001/XMLSchema#".to_string(),
                ),
            ],
        }
    }
}

impl TextOptions {
    pub fn with_format(mut self, format: RdfFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), namespace.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ValidationOptions::default();
        assert!(opts.parallel);
        assert!(opts.max_concurrency >= 1);
        assert_eq!(opts.timeout_ms(), 5000);
        assert_eq!(opts.max_recursion_depth, 50);
        assert_eq!(opts.max_list_depth, 100);
        assert!(opts.check().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let opts = ValidationOptions::default().with_max_concurrency(0);
        assert!(matches!(opts.check(), Err(Error::InvalidOptions(_))));
    }
}
