//! Boundary with the graph-text codec.
//!
//! Everything that turns text into a [`Graph`] or a [`Graph`] into text goes
//! through here, so the rest of the crate only ever sees parsed graphs.

use crate::error::{Error, GraphKind, Result};
use crate::options::TextOptions;
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{Graph, Triple};
use std::fs;
use std::path::Path;
use url::Url;

/// Parses `text` in the given format into an in-memory graph.
///
/// Named graphs in quad formats are flattened into the returned graph.
pub fn parse_graph(text: &str, format: RdfFormat, base_iri: Option<&str>) -> std::result::Result<Graph, String> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base) = base_iri {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| format!("invalid base IRI <{}>: {}", base, e))?;
    }
    let mut graph = Graph::new();
    for quad in parser.for_reader(text.as_bytes()) {
        let quad = quad.map_err(|e| e.to_string())?;
        graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(graph)
}

/// Picks a parser format from a file extension, defaulting to Turtle.
pub fn format_for_path(path: &Path) -> RdfFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("n3") => RdfFormat::Turtle,
        Some("xml") => RdfFormat::RdfXml,
        Some(ext) => RdfFormat::from_extension(ext).unwrap_or(RdfFormat::Turtle),
        None => RdfFormat::Turtle,
    }
}

/// Reads and parses one of the two input files of a run.
///
/// The base IRI for relative references is the file's own `file://` URL.
pub fn read_graph_file(kind: GraphKind, path: &Path) -> Result<Graph> {
    let text = fs::read_to_string(path).map_err(|source| Error::FileRead {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    let base = fs::canonicalize(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(|url| url.to_string());
    parse_graph(&text, format_for_path(path), base.as_deref())
        .map_err(|message| Error::Syntax { kind, message })
}

/// Serializes a graph with the configured format and namespace prefixes.
pub fn write_graph(graph: &Graph, options: &TextOptions) -> Result<String> {
    let mut serializer = RdfSerializer::from_format(options.format);
    for (prefix, namespace) in &options.prefixes {
        serializer = serializer
            .with_prefix(prefix.as_str(), namespace.as_str())
            .map_err(|e| Error::Serialize(format!("bad prefix {}: <{}>: {}", prefix, namespace, e)))?;
    }
    let mut writer = serializer.for_writer(Vec::new());
    for triple in graph.iter() {
        writer
            .serialize_triple(triple)
            .map_err(|e| Error::Serialize(e.to_string()))?;
    }
    let bytes = writer.finish().map_err(|e| Error::Serialize(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::path::PathBuf;

    #[test]
    fn parses_turtle_with_prefixes() -> std::result::Result<(), Box<dyn StdError>> {
        let graph = parse_graph(
            "@prefix ex: <http://example.org/> .\nex:a ex:p ex:b , ex:c .",
            RdfFormat::Turtle,
            None,
        )?;
        assert_eq!(graph.len(), 2);
        Ok(())
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = parse_graph("ex:a ex:p", RdfFormat::Turtle, None);
        assert!(err.is_err());
    }

    #[test]
    fn missing_file_is_wrapped_with_kind_and_path() {
        let path = PathBuf::from("/definitely/not/here/shapes.ttl");
        match read_graph_file(GraphKind::Shapes, &path) {
            Err(Error::FileRead { kind, path: p, .. }) => {
                assert_eq!(kind, GraphKind::Shapes);
                assert_eq!(p, path);
            }
            other => panic!("expected a file read error, got {:?}", other),
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(format_for_path(Path::new("a.nt")), RdfFormat::NTriples);
        assert_eq!(format_for_path(Path::new("a.ttl")), RdfFormat::Turtle);
        assert_eq!(format_for_path(Path::new("a.xml")), RdfFormat::RdfXml);
        assert_eq!(format_for_path(Path::new("a")), RdfFormat::Turtle);
    }

    #[test]
    fn written_turtle_parses_back() -> std::result::Result<(), Box<dyn StdError>> {
        let graph = parse_graph(
            "<http://example.org/a> <http://example.org/p> \"x\"@en .",
            RdfFormat::NTriples,
            None,
        )?;
        let text = write_graph(&graph, &TextOptions::default())?;
        let reparsed = parse_graph(&text, RdfFormat::Turtle, None)?;
        assert_eq!(reparsed.len(), graph.len());
        assert!(graph.iter().all(|t| reparsed.contains(t)));
        Ok(())
    }
}
