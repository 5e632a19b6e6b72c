//! # graphsim
//!
//! Similarity core for architectural design graphs (RDF models).
//!
//! An upstream pipeline scores every pair of models on four channels
//! (content, typed-edge, edge-set, structural) and writes the results as CSV
//! matrices and pairwise tables. This crate reads those results and adds the
//! few pieces that carry actual logic:
//!
//! - [`parser`]: Turtle / RDF-XML parsing with ordered fallback
//! - [`features`]: predicate-histogram fingerprints of a graph
//! - [`similarity`]: cosine ranking of reference graphs against a query
//! - [`verify`]: symmetry, unit-diagonal and range checks of a matrix
//! - [`fusion`]: fixed-weight combination of the four channels
//!
//! plus loaders for the bundle itself ([`matrix`], [`schema`], [`pipeline`],
//! [`dataset`], [`cache`]).
//!
//! All operations are synchronous and pure apart from file reads. Logging
//! goes through the `log` facade; install any logger to see it.
//!
//! ```
//! use graphsim::features::extract_features;
//! use graphsim::parser::{parse, GraphSource};
//! use graphsim::similarity::rank_by_similarity;
//!
//! let upload = br#"
//!     @prefix o: <http://example.org/onto#> .
//!     <urn:w1> o:adjacentElement <urn:w2> .
//!     <urn:w1> o:hasFunction <urn:f1> .
//! "#.to_vec();
//! let query = extract_features(&parse(&GraphSource::Bytes(upload)).unwrap());
//! let refs = vec![("B01".to_string(), query.clone())];
//! let top = rank_by_similarity(&query, &refs, 3);
//! assert!((top[0].score - 1.0).abs() < 1e-12);
//! ```
pub mod cache;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod fusion;
pub mod matrix;
pub mod operators;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod similarity;
pub mod verify;

pub use errors::{GraphSimError, Result};
pub use features::{FeatureVector, PredicateKey, extract_features, fingerprint};
pub use fusion::{FUSION_WEIGHTS, FusionWeights, fuse};
pub use matrix::SimilarityMatrix;
pub use parser::{GraphParser, GraphSource, Triple, TripleSet, parse};
pub use similarity::{RankedMatch, cosine, rank_by_similarity};
pub use verify::{MatrixVerification, verify};

#[cfg(test)]
mod tests;
