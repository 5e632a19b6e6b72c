//! Predicate-histogram fingerprints of design graphs.
//!
//! A graph is reduced to seven counts, one per [`PredicateKey`]: six
//! domain predicates recognised by the suffix of their IRI, and a catch-all
//! for `rdf:type`-like predicates. Counts are L2-normalised so that graphs of
//! very different size become comparable by cosine.
//!
//! Positions are fixed by the lexicographic order of the key names:
//!
//! | idx | key                   |
//! |-----|-----------------------|
//! | 0   | `adjacentElement`     |
//! | 1   | `adjacentZone`        |
//! | 2   | `bfo_0000178`         |
//! | 3   | `hasFunction`         |
//! | 4   | `hasQuality`          |
//! | 5   | `intersectingElement` |
//! | 6   | `rdf_type`            |
//!
//! ```
//! use graphsim::features::{extract_features, PredicateKey};
//! use graphsim::parser::{Triple, TripleSet};
//!
//! let triples: TripleSet = vec![
//!     Triple::new("<urn:s1>", "http://x.org/o#adjacentElement", "<urn:o1>"),
//!     Triple::new("<urn:s1>", "http://x.org/o#adjacentElement", "<urn:o2>"),
//!     Triple::new("<urn:s2>", "http://x.org/o#hasFunction", "<urn:o3>"),
//! ].into_iter().collect();
//!
//! let fv = extract_features(&triples);
//! assert!((fv.get(PredicateKey::AdjacentElement) - 0.894).abs() < 1e-3);
//! assert!((fv.norm() - 1.0).abs() < 1e-9);
//! ```
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use log::{debug, trace};

use crate::errors::Result;
use crate::operators::{norm, normalise};
use crate::parser::{GraphParser, GraphSource, TripleSet};

/// Number of fingerprint dimensions.
pub const N_FEATURES: usize = 7;

/// Prefix of the exported feature column names.
pub const FEATURE_PREFIX: &str = "feat__";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PredicateKey {
    AdjacentElement,
    AdjacentZone,
    IntersectingElement,
    /// BFO `continuant part of`, used for storey/zone containment.
    Bfo0000178,
    HasFunction,
    HasQuality,
    RdfType,
}

impl PredicateKey {
    /// Domain predicates in matching priority order. `RdfType` is not listed:
    /// it is only a fallback after all of these failed.
    pub const DOMAIN: [PredicateKey; 6] = [
        PredicateKey::AdjacentElement,
        PredicateKey::AdjacentZone,
        PredicateKey::IntersectingElement,
        PredicateKey::Bfo0000178,
        PredicateKey::HasFunction,
        PredicateKey::HasQuality,
    ];

    /// All keys in vector position order (lexicographic by name).
    pub const ORDERED: [PredicateKey; N_FEATURES] = [
        PredicateKey::AdjacentElement,
        PredicateKey::AdjacentZone,
        PredicateKey::Bfo0000178,
        PredicateKey::HasFunction,
        PredicateKey::HasQuality,
        PredicateKey::IntersectingElement,
        PredicateKey::RdfType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PredicateKey::AdjacentElement => "adjacentElement",
            PredicateKey::AdjacentZone => "adjacentZone",
            PredicateKey::IntersectingElement => "intersectingElement",
            PredicateKey::Bfo0000178 => "bfo_0000178",
            PredicateKey::HasFunction => "hasFunction",
            PredicateKey::HasQuality => "hasQuality",
            PredicateKey::RdfType => "rdf_type",
        }
    }

    /// Position of this key inside a [`FeatureVector`].
    pub fn index(self) -> usize {
        match self {
            PredicateKey::AdjacentElement => 0,
            PredicateKey::AdjacentZone => 1,
            PredicateKey::Bfo0000178 => 2,
            PredicateKey::HasFunction => 3,
            PredicateKey::HasQuality => 4,
            PredicateKey::IntersectingElement => 5,
            PredicateKey::RdfType => 6,
        }
    }

    pub fn feature_name(self) -> String {
        format!("{}{}", FEATURE_PREFIX, self.name())
    }

    /// Buckets a predicate IRI by case-insensitive suffix.
    ///
    /// ```
    /// use graphsim::features::PredicateKey;
    /// assert_eq!(
    ///     PredicateKey::from_predicate("http://purl.obolibrary.org/obo/BFO_0000178"),
    ///     Some(PredicateKey::Bfo0000178)
    /// );
    /// assert_eq!(
    ///     PredicateKey::from_predicate("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
    ///     Some(PredicateKey::RdfType)
    /// );
    /// assert_eq!(PredicateKey::from_predicate("http://x.org/label"), None);
    /// ```
    pub fn from_predicate(iri: &str) -> Option<PredicateKey> {
        let low = iri.to_lowercase();
        if let Some(key) = Self::DOMAIN
            .iter()
            .copied()
            .find(|k| low.ends_with(&k.name().to_lowercase()))
        {
            return Some(key);
        }
        if low.ends_with("#type") || low.ends_with("/type") {
            return Some(PredicateKey::RdfType);
        }
        None
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalised predicate histogram of one graph.
///
/// Invariant: `norm() == 1.0` (within float error) unless every count is zero,
/// in which case every value is `0.0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    counts: [f64; N_FEATURES],
    values: [f64; N_FEATURES],
}

impl FeatureVector {
    /// Builds from raw counts in [`PredicateKey::ORDERED`] position order.
    pub fn from_counts(counts: [f64; N_FEATURES]) -> Self {
        let mut values = counts;
        normalise(&mut values);
        Self { counts, values }
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    #[inline]
    pub fn get(&self, key: PredicateKey) -> f64 {
        self.values[key.index()]
    }

    #[inline]
    pub fn count(&self, key: PredicateKey) -> f64 {
        self.counts[key.index()]
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        norm(&self.values)
    }

    /// No predicate of the graph matched any key.
    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0.0)
    }

    /// `feat__<key>` names in position order.
    pub fn feature_names() -> Vec<String> {
        PredicateKey::ORDERED.iter().map(|k| k.feature_name()).collect()
    }

    /// Column-name view, as written to exported feature tables.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        PredicateKey::ORDERED
            .iter()
            .map(|k| (k.feature_name(), self.get(*k)))
            .collect()
    }
}

/// Maps a triple set to its fingerprint. Triple order does not matter.
pub fn extract_features(triples: &TripleSet) -> FeatureVector {
    let mut counts = [0.0_f64; N_FEATURES];
    let mut ignored = 0usize;
    for t in triples {
        match PredicateKey::from_predicate(&t.predicate) {
            Some(key) => counts[key.index()] += 1.0,
            None => ignored += 1,
        }
    }
    trace!("Feature counts {:?}, {} triples ignored", counts, ignored);
    let fv = FeatureVector::from_counts(counts);
    debug!(
        "Extracted fingerprint from {} triples ({} matched)",
        triples.len(),
        triples.len() - ignored
    );
    fv
}

/// Parses `source` with the default parser and extracts its fingerprint.
pub fn fingerprint(source: &GraphSource) -> Result<FeatureVector> {
    fingerprint_with(&GraphParser::default(), source)
}

pub fn fingerprint_with(parser: &GraphParser, source: &GraphSource) -> Result<FeatureVector> {
    let triples = parser.parse(source)?;
    Ok(extract_features(&triples))
}
