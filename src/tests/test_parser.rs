use crate::errors::GraphSimError;
use crate::parser::{
    DEFAULT_BASE_IRI, GraphParser, GraphSource, RdfFormat, RdfXmlStrategy, Triple,
    TurtleStrategy, parse,
};
use crate::tests::test_data::{
    GARBAGE, RELATIVE_RDF_XML, RELATIVE_TTL, WALL_RDF_XML, WALLS_TTL, write_file,
};

fn bytes(s: &str) -> GraphSource {
    GraphSource::Bytes(s.as_bytes().to_vec())
}

#[test]
fn turtle_is_parsed_first() {
    let parser = GraphParser::default();
    let (format, triples) = parser.parse_bytes(WALLS_TTL.as_bytes()).unwrap();

    assert_eq!(format, RdfFormat::Turtle);
    assert_eq!(triples.len(), 7);
    assert!(triples.iter().any(|t| t.predicate == "http://example.org/onto#adjacentElement"
        && t.subject == "<http://example.org/b/w1>"
        && t.object == "<http://example.org/b/w3>"));
}

#[test]
fn rdf_xml_is_the_fallback() {
    let parser = GraphParser::default();
    let (format, triples) = parser.parse_bytes(WALL_RDF_XML.as_bytes()).unwrap();

    assert_eq!(format, RdfFormat::RdfXml);
    assert_eq!(triples.len(), 3);
    assert!(
        triples
            .iter()
            .any(|t| t.predicate == "http://www.w3.org/1999/02/22-rdf-syntax-ns#type")
    );
}

#[test]
fn both_failures_are_aggregated() {
    let err = parse(&bytes(GARBAGE)).unwrap_err();
    match err {
        GraphSimError::Parse { attempts } => {
            let formats: Vec<_> = attempts.iter().map(|a| a.format).collect();
            assert_eq!(formats, vec![RdfFormat::Turtle, RdfFormat::RdfXml]);
            assert!(attempts.iter().all(|a| !a.cause.is_empty()));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn trailing_garbage_returns_no_partial_set() {
    let doc = format!("<urn:a> <urn:p#adjacentElement> <urn:b> .\n{GARBAGE}");
    assert!(matches!(
        parse(&bytes(&doc)),
        Err(GraphSimError::Parse { .. })
    ));
}

#[test]
fn empty_document_is_an_empty_graph() {
    let triples = parse(&bytes("")).unwrap();
    assert!(triples.is_empty());
    assert_eq!(triples.stats().subjects, 0);
}

#[test]
fn stats_count_unique_subjects() {
    let triples = parse(&bytes(WALLS_TTL)).unwrap();
    let stats = triples.stats();
    assert_eq!(stats.triples, 7);
    // w1, z1, w2
    assert_eq!(stats.subjects, 3);
}

#[test]
fn path_source_reads_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "wall.rdf", WALL_RDF_XML);

    let triples = parse(&GraphSource::from(path)).unwrap();
    assert_eq!(triples.len(), 3);
}

#[test]
fn missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse(&GraphSource::Path(dir.path().join("nope.ttl"))).unwrap_err();
    assert!(matches!(err, GraphSimError::Io(_)));
}

#[test]
fn strategy_order_is_configurable() {
    let xml_only = GraphParser::new().with_strategies(vec![Box::new(RdfXmlStrategy)]);
    assert_eq!(xml_only.formats(), vec![RdfFormat::RdfXml]);
    assert!(xml_only.parse(&bytes(WALLS_TTL)).is_err());
    assert_eq!(xml_only.parse(&bytes(WALL_RDF_XML)).unwrap().len(), 3);

    let reversed = GraphParser::new()
        .with_strategies(vec![Box::new(RdfXmlStrategy), Box::new(TurtleStrategy)]);
    let (format, _) = reversed.parse_bytes(WALLS_TTL.as_bytes()).unwrap();
    assert_eq!(format, RdfFormat::Turtle);
}

#[test]
fn no_strategies_fails_cleanly() {
    let parser = GraphParser::new().with_strategies(Vec::new());
    let err = parser.parse(&bytes(WALLS_TTL)).unwrap_err();
    assert!(err.to_string().contains("no parser strategy"));
}

#[test]
fn triple_set_collects_from_iterator() {
    let set: crate::parser::TripleSet = vec![
        Triple::new("<urn:s>", "urn:p", "<urn:o1>"),
        Triple::new("<urn:s>", "urn:p", "<urn:o2>"),
    ]
    .into_iter()
    .collect();
    assert_eq!(set.len(), 2);
    assert_eq!(set.unique_subjects().len(), 1);
}

#[test]
fn relative_iris_in_turtle_resolve_against_default_base() {
    let triples = parse(&bytes(RELATIVE_TTL)).unwrap();
    assert_eq!(triples.len(), 2);
    let wall1 = format!("<{DEFAULT_BASE_IRI}#Wall1>");
    assert!(triples.iter().all(|t| t.subject == wall1));
    assert!(triples.iter().any(|t| t.predicate == "http://example.org/onto#adjacentElement"
        && t.object == format!("<{DEFAULT_BASE_IRI}#Wall2>")));
}

#[test]
fn relative_iris_in_rdf_xml_resolve_against_default_base() {
    let (format, triples) = GraphParser::default()
        .parse_bytes(RELATIVE_RDF_XML.as_bytes())
        .unwrap();
    assert_eq!(format, RdfFormat::RdfXml);
    assert_eq!(triples.len(), 1);
    let t = triples.iter().next().unwrap();
    assert_eq!(t.subject, format!("<{DEFAULT_BASE_IRI}#Wall1>"));
    assert_eq!(t.object, format!("<{DEFAULT_BASE_IRI}#Wall2>"));
}

#[test]
fn path_source_uses_file_uri_as_base() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "relative.rdf", RELATIVE_RDF_XML);
    let source = GraphSource::from(path);

    let base = source.base_iri();
    assert!(base.starts_with("file:///"), "{base}");
    assert!(base.ends_with("/relative.rdf"), "{base}");

    let triples = parse(&source).unwrap();
    let t = triples.iter().next().unwrap();
    assert_eq!(t.subject, format!("<{base}#Wall1>"));
}

#[test]
fn explicit_base_iri_is_honoured() {
    let (_, triples) = GraphParser::default()
        .parse_bytes_with_base(RELATIVE_TTL.as_bytes(), "http://designs.example/b07")
        .unwrap();
    assert!(triples
        .iter()
        .all(|t| t.subject == "<http://designs.example/b07#Wall1>"));
}
