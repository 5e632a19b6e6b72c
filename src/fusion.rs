//! Fixed-weight fusion of the four similarity channels.
//!
//! `S_total = 0.30·S_content + 0.20·S_typed + 0.10·S_edge + 0.40·S_struct`
//!
//! Weights are not re-normalised at combine time; they sum to one by
//! construction. Batch fusion joins a content/typed/edge pair table with a
//! structural pair table on the unordered pair, so `(A, B)` and `(B, A)` are
//! the same row.
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use log::{debug, info, trace};

use crate::schema::{ChannelValues, PairRecord, PairTable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    pub content: f64,
    pub typed: f64,
    pub edge: f64,
    pub structural: f64,
}

/// Authoritative channel weights.
pub const FUSION_WEIGHTS: FusionWeights = FusionWeights {
    content: 0.30,
    typed: 0.20,
    edge: 0.10,
    structural: 0.40,
};

impl Default for FusionWeights {
    fn default() -> Self {
        FUSION_WEIGHTS
    }
}

// Approximate equality, weights come from float arithmetic
impl PartialEq for FusionWeights {
    fn eq(&self, other: &Self) -> bool {
        approx::relative_eq!(self.content, other.content)
            && approx::relative_eq!(self.typed, other.typed)
            && approx::relative_eq!(self.edge, other.edge)
            && approx::relative_eq!(self.structural, other.structural)
    }
}

impl fmt::Display for FusionWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S_total = {}·S_content + {}·S_typed + {}·S_edge + {}·S_struct",
            self.content, self.typed, self.edge, self.structural
        )
    }
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.content + self.typed + self.edge + self.structural
    }

    /// Scales the weights to sum to one. All-zero weights are returned as is.
    pub fn renormalised(&self) -> Self {
        let s = self.sum();
        if s <= 0.0 {
            return *self;
        }
        Self {
            content: self.content / s,
            typed: self.typed / s,
            edge: self.edge / s,
            structural: self.structural / s,
        }
    }

    /// Weighted sum of the four channel scores.
    ///
    /// ```
    /// use graphsim::fusion::{ChannelScores, FUSION_WEIGHTS};
    /// let s = ChannelScores { content: 0.8, typed: 0.6, edge: 0.0, structural: 0.9 };
    /// assert!((FUSION_WEIGHTS.combine(&s) - 0.72).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn combine(&self, s: &ChannelScores) -> f64 {
        self.content * s.content
            + self.typed * s.typed
            + self.edge * s.edge
            + self.structural * s.structural
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelScores {
    pub content: f64,
    pub typed: f64,
    pub edge: f64,
    pub structural: f64,
}

/// Unordered pair identity: the two model ids in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

impl From<&PairRecord> for PairKey {
    fn from(r: &PairRecord) -> Self {
        PairKey::new(&r.model_a, &r.model_b)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ↔ {}", self.first, self.second)
    }
}

/// Channel scores of one model pair as delivered by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub model_a: String,
    pub model_b: String,
    pub scores: ChannelScores,
    /// Precomputed total, if the pipeline shipped one.
    pub total: Option<f64>,
}

impl ChannelRecord {
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.model_a, &self.model_b)
    }

    pub fn fuse(&self, weights: &FusionWeights) -> FusedPair {
        FusedPair {
            key: self.key(),
            total: weights.combine(&self.scores),
            components: self.scores,
        }
    }
}

/// One output row of batch fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedPair {
    pub key: PairKey,
    pub total: f64,
    pub components: ChannelScores,
}

/// Inner join of `pair_scores` (content, typed, edge) with `struct_scores`
/// (structural) on [`PairKey`], then weighted sum per joined pair.
///
/// Pairs missing from either table, or lacking one of their channel values,
/// are dropped. Output follows `pair_scores` order; if a structural pair is
/// listed twice the first row wins.
pub fn fuse(
    pair_scores: &PairTable,
    struct_scores: &PairTable,
    weights: &FusionWeights,
) -> Vec<FusedPair> {
    let mut structural: HashMap<PairKey, f64> = HashMap::with_capacity(struct_scores.len());
    for r in struct_scores.iter() {
        if let Some(s) = r.scores.structural {
            structural.entry(PairKey::from(r)).or_insert(s);
        }
    }

    let mut out = Vec::with_capacity(pair_scores.len());
    let mut dropped = 0usize;
    for r in pair_scores.iter() {
        let key = PairKey::from(r);
        let joined = match (
            r.scores.content,
            r.scores.typed,
            r.scores.edge,
            structural.get(&key),
        ) {
            (Some(content), Some(typed), Some(edge), Some(&s)) => ChannelRecord {
                model_a: r.model_a.clone(),
                model_b: r.model_b.clone(),
                scores: ChannelScores {
                    content,
                    typed,
                    edge,
                    structural: s,
                },
                total: r.scores.total,
            },
            _ => {
                dropped += 1;
                continue;
            }
        };
        out.push(joined.fuse(weights));
    }

    info!(
        "Fused {} pairs ({} dropped by the join) with {}",
        out.len(),
        dropped,
        weights
    );
    debug!(
        "Join inputs: {} pair rows, {} structural rows",
        pair_scores.len(),
        struct_scores.len()
    );
    out
}

/// Channel values of one pair, seen from a selected model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub other: String,
    pub scores: ChannelValues,
}

/// Rows of a pairwise table that touch `model` and whose other side is one
/// of `others`, best first by the table's first score column (total, else
/// content, typed, edge, struct). Rows without that value sort last.
pub fn channel_breakdown(table: &PairTable, model: &str, others: &[&str]) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = table
        .iter()
        .filter_map(|r| {
            let other = r.other(model)?;
            others.contains(&other).then(|| BreakdownRow {
                other: other.to_string(),
                scores: r.scores,
            })
        })
        .collect();
    let Some(field) = table.primary_field() else {
        return rows;
    };
    trace!("Breakdown for {} ranked by {:?}", model, field);
    rows.sort_by(|a, b| {
        let (x, y) = (
            a.scores.get(field).unwrap_or(f64::NEG_INFINITY),
            b.scores.get(field).unwrap_or(f64::NEG_INFINITY),
        );
        y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}
