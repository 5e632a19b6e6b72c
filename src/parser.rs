//! Graph parsing with ordered format fallback.
//!
//! A graph document arrives either as bytes (an uploaded file) or as a path on
//! disk. It is held as one immutable buffer so each [`ParserStrategy`] reads
//! the same bytes from the start; there is no stream position to rewind.
//!
//! The default [`GraphParser`] tries Turtle first and RDF/XML second. The first
//! strategy that succeeds wins. When all of them fail the error carries every
//! attempt's cause and no partial triple set is returned.
//!
//! ```
//! use graphsim::parser::{parse, GraphSource};
//!
//! let ttl = b"<urn:a> <urn:p#adjacentElement> <urn:b> .".to_vec();
//! let triples = parse(&GraphSource::Bytes(ttl)).unwrap();
//! assert_eq!(triples.len(), 1);
//! ```
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use oxrdfxml::RdfXmlParser;
use oxttl::TurtleParser;
use serde::{Deserialize, Serialize};
use url::Url;

use log::{debug, info, trace};

use crate::errors::{GraphSimError, ParseAttempt, Result};

/// Base IRI for documents that arrive as bytes with no location.
pub const DEFAULT_BASE_IRI: &str = "file:///upload";

/// A (subject, predicate, object) statement.
///
/// Subject and object keep their N-Triples spelling (`<iri>`, `_:b0`,
/// `"literal"@en`); the predicate is the bare IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl From<oxrdf::Triple> for Triple {
    fn from(t: oxrdf::Triple) -> Self {
        Self {
            subject: t.subject.to_string(),
            predicate: t.predicate.as_str().to_string(),
            object: t.object.to_string(),
        }
    }
}

/// Summary shown next to an uploaded graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub triples: usize,
    pub subjects: usize,
}

/// All triples of one parsed graph document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripleSet {
    triples: Vec<Triple>,
}

impl TripleSet {
    pub fn new(triples: Vec<Triple>) -> Self {
        Self { triples }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn unique_subjects(&self) -> BTreeSet<&str> {
        self.triples.iter().map(|t| t.subject.as_str()).collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            triples: self.len(),
            subjects: self.unique_subjects().len(),
        }
    }
}

impl FromIterator<Triple> for TripleSet {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TripleSet {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

/// The two textual serializations accepted for design graphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfFormat {
    Turtle,
    RdfXml,
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfFormat::Turtle => f.write_str("turtle"),
            RdfFormat::RdfXml => f.write_str("rdf/xml"),
        }
    }
}

/// Where a graph document comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl GraphSource {
    /// Loads the whole document once. Every strategy then re-reads this buffer.
    pub fn read_all(&self) -> Result<std::borrow::Cow<'_, [u8]>> {
        match self {
            GraphSource::Bytes(b) => Ok(std::borrow::Cow::Borrowed(b.as_slice())),
            GraphSource::Path(p) => {
                trace!("Reading graph document {}", p.display());
                Ok(std::borrow::Cow::Owned(fs::read(p)?))
            }
        }
    }

    /// Base IRI that relative IRIs in the document resolve against: the
    /// file's `file://` URI for a path, [`DEFAULT_BASE_IRI`] for bytes.
    pub fn base_iri(&self) -> String {
        match self {
            GraphSource::Bytes(_) => DEFAULT_BASE_IRI.to_string(),
            GraphSource::Path(p) => std::path::absolute(p)
                .ok()
                .and_then(|abs| Url::from_file_path(abs).ok())
                .map(String::from)
                .unwrap_or_else(|| DEFAULT_BASE_IRI.to_string()),
        }
    }

    fn describe(&self) -> String {
        match self {
            GraphSource::Bytes(b) => format!("{} in-memory bytes", b.len()),
            GraphSource::Path(p) => p.display().to_string(),
        }
    }
}

impl From<PathBuf> for GraphSource {
    fn from(p: PathBuf) -> Self {
        GraphSource::Path(p)
    }
}

impl From<&std::path::Path> for GraphSource {
    fn from(p: &std::path::Path) -> Self {
        GraphSource::Path(p.to_path_buf())
    }
}

impl From<Vec<u8>> for GraphSource {
    fn from(b: Vec<u8>) -> Self {
        GraphSource::Bytes(b)
    }
}

/// One way of turning document bytes into triples.
pub trait ParserStrategy {
    fn format(&self) -> RdfFormat;
    /// Parses the full document, resolving relative IRIs against `base_iri`.
    /// Any syntax error fails the whole attempt.
    fn parse(&self, bytes: &[u8], base_iri: &str) -> std::result::Result<TripleSet, String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TurtleStrategy;

impl ParserStrategy for TurtleStrategy {
    fn format(&self) -> RdfFormat {
        RdfFormat::Turtle
    }

    fn parse(&self, bytes: &[u8], base_iri: &str) -> std::result::Result<TripleSet, String> {
        TurtleParser::new()
            .with_base_iri(base_iri)
            .map_err(|e| e.to_string())?
            .for_reader(bytes)
            .map(|t| t.map(Triple::from).map_err(|e| e.to_string()))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RdfXmlStrategy;

impl ParserStrategy for RdfXmlStrategy {
    fn format(&self) -> RdfFormat {
        RdfFormat::RdfXml
    }

    fn parse(&self, bytes: &[u8], base_iri: &str) -> std::result::Result<TripleSet, String> {
        RdfXmlParser::new()
            .with_base_iri(base_iri)
            .map_err(|e| e.to_string())?
            .for_reader(bytes)
            .map(|t| t.map(Triple::from).map_err(|e| e.to_string()))
            .collect()
    }
}

/// Ordered list of strategies; first success wins.
pub struct GraphParser {
    strategies: Vec<Box<dyn ParserStrategy + Send + Sync>>,
}

impl Default for GraphParser {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(TurtleStrategy), Box::new(RdfXmlStrategy)],
        }
    }
}

impl GraphParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the strategy list, e.g. to try RDF/XML first or only.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ParserStrategy + Send + Sync>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn formats(&self) -> Vec<RdfFormat> {
        self.strategies.iter().map(|s| s.format()).collect()
    }

    /// Parses in-memory bytes against [`DEFAULT_BASE_IRI`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<(RdfFormat, TripleSet)> {
        self.parse_bytes_with_base(bytes, DEFAULT_BASE_IRI)
    }

    pub fn parse_bytes_with_base(
        &self,
        bytes: &[u8],
        base_iri: &str,
    ) -> Result<(RdfFormat, TripleSet)> {
        let mut attempts = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            match strategy.parse(bytes, base_iri) {
                Ok(triples) => {
                    debug!(
                        "Parsed {} triples as {} after {} failed attempt(s)",
                        triples.len(),
                        strategy.format(),
                        attempts.len()
                    );
                    return Ok((strategy.format(), triples));
                }
                Err(cause) => {
                    trace!("{} attempt failed: {}", strategy.format(), cause);
                    attempts.push(ParseAttempt {
                        format: strategy.format(),
                        cause,
                    });
                }
            }
        }
        Err(GraphSimError::Parse { attempts })
    }

    pub fn parse(&self, source: &GraphSource) -> Result<TripleSet> {
        info!("Parsing graph from {}", source.describe());
        let bytes = source.read_all()?;
        self.parse_bytes_with_base(&bytes, &source.base_iri())
            .map(|(_, triples)| triples)
    }
}

/// Parses with the default Turtle → RDF/XML fallback.
pub fn parse(source: &GraphSource) -> Result<TripleSet> {
    GraphParser::default().parse(source)
}
