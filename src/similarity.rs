//! Ranking of reference graphs against a query fingerprint.
//!
//! The quick-compare score is the cosine of two predicate-histogram
//! fingerprints. It is a content-only approximation and is not on the scale
//! of the precomputed `S_content` channel; the two must not be mixed.
use serde::{Deserialize, Serialize};

use log::{debug, info, warn};

use crate::errors::Result;
use crate::features::{FeatureVector, extract_features};
use crate::parser::{GraphParser, GraphSource};

pub use crate::operators::cosine;

/// One ranked candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub model: String,
    pub score: f64,
}

impl RankedMatch {
    pub fn new(model: impl Into<String>, score: f64) -> Self {
        Self {
            model: model.into(),
            score,
        }
    }
}

/// Sorts descending by score, keeping input order among ties, and truncates.
pub(crate) fn top_n_stable(mut results: Vec<RankedMatch>, top_n: usize) -> Vec<RankedMatch> {
    // `sort_by` is stable; NaN scores sink to the end.
    results.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (false, false) => b
            .score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    });
    results.truncate(top_n);
    results
}

/// Cosine of `query` against every candidate, best first.
///
/// Ties keep candidate input order. Empty candidates or `top_n == 0` give an
/// empty result.
///
/// ```
/// use graphsim::features::FeatureVector;
/// use graphsim::similarity::rank_by_similarity;
///
/// let q = FeatureVector::from_counts([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// let refs = vec![
///     ("far".to_string(), FeatureVector::from_counts([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
///     ("near".to_string(), FeatureVector::from_counts([2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
/// ];
/// let ranked = rank_by_similarity(&q, &refs, 5);
/// assert_eq!(ranked[0].model, "near");
/// assert_eq!(ranked.len(), 2);
/// ```
pub fn rank_by_similarity(
    query: &FeatureVector,
    candidates: &[(String, FeatureVector)],
    top_n: usize,
) -> Vec<RankedMatch> {
    if top_n == 0 || candidates.is_empty() {
        return Vec::new();
    }
    let results = candidates
        .iter()
        .map(|(id, fv)| RankedMatch::new(id.clone(), cosine(query.values(), fv.values())))
        .collect();
    top_n_stable(results, top_n)
}

/// Result of an on-the-fly comparison of one uploaded graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickCompare {
    /// Fingerprint of the uploaded graph.
    pub query: FeatureVector,
    /// Content-cosine ranking; not comparable with `S_content`.
    pub matches: Vec<RankedMatch>,
    /// References skipped because they could not be parsed.
    pub skipped: Vec<String>,
}

impl QuickCompare {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Fingerprints `query` and every reference, then ranks the references.
///
/// A query that cannot be parsed is an error. A reference that cannot be
/// parsed is logged, recorded in `skipped` and left out of the ranking.
pub fn compare_to_references(
    parser: &GraphParser,
    query: &GraphSource,
    references: &[(String, GraphSource)],
    top_n: usize,
) -> Result<QuickCompare> {
    info!(
        "Quick compare against {} reference graphs (top {})",
        references.len(),
        top_n
    );
    let query_fv = extract_features(&parser.parse(query)?);

    let mut candidates = Vec::with_capacity(references.len());
    let mut skipped = Vec::new();
    for (id, source) in references {
        match parser.parse(source) {
            Ok(triples) => candidates.push((id.clone(), extract_features(&triples))),
            Err(e) => {
                warn!("Skipping reference {}: {}", id, e);
                skipped.push(id.clone());
            }
        }
    }
    debug!(
        "{} references fingerprinted, {} skipped",
        candidates.len(),
        skipped.len()
    );

    let matches = rank_by_similarity(&query_fv, &candidates, top_n);
    Ok(QuickCompare {
        query: query_fv,
        matches,
        skipped,
    })
}
