//! The precomputed result bundle of the similarity pipeline, as one view.
//!
//! The pipeline writes one CSV matrix per channel and per structural
//! sub-channel, plus pairwise summary tables. Every file is optional: an
//! absent or unreadable file shows up as an empty matrix/table and is reported
//! as missing by the verification table.
//!
//! ```no_run
//! use graphsim::dataset::{DatasetLayout, DatasetLoader};
//!
//! let layout = DatasetLayout::new("/srv/designs").with_reference_dir("/srv/designs/rdf");
//! let data = DatasetLoader::new(layout).load();
//! for m in data.top_matches("Building05", 5) {
//!     println!("{} {:.3}", m.model, m.score);
//! }
//! ```
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use log::{debug, info, warn};

use crate::cache::FileCache;
use crate::errors::Result;
use crate::fusion::{BreakdownRow, FusedPair, FusionWeights, channel_breakdown, fuse};
use crate::matrix::SimilarityMatrix;
use crate::parser::{GraphParser, GraphSource};
use crate::pipeline::{RecordTable, SystemScoresStatus, json_object_from_slice};
use crate::schema::{ColumnAliases, PairTable};
use crate::similarity::{QuickCompare, RankedMatch, compare_to_references};
use crate::verify::{VerificationRow, verify_all};

/// Extensions tried, in order, when locating a reference graph file.
pub const GRAPH_EXTENSIONS: [&str; 3] = ["ttl", "rdf", "nt"];

/// Every similarity matrix the bundle may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Total,
    Content,
    TypedEdge,
    EdgeSets,
    Structural,
    S1Adjacency,
    S2Motif,
    S3System,
    S4Functional,
    StructFused,
}

impl Channel {
    pub const ALL: [Channel; 10] = [
        Channel::Total,
        Channel::Content,
        Channel::TypedEdge,
        Channel::EdgeSets,
        Channel::Structural,
        Channel::S1Adjacency,
        Channel::S2Motif,
        Channel::S3System,
        Channel::S4Functional,
        Channel::StructFused,
    ];

    /// Channels shown in a model-pair comparison.
    pub const PAIR_COMPARISON: [Channel; 9] = [
        Channel::Total,
        Channel::Content,
        Channel::TypedEdge,
        Channel::EdgeSets,
        Channel::Structural,
        Channel::S1Adjacency,
        Channel::S2Motif,
        Channel::S3System,
        Channel::S4Functional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Total => "Total",
            Channel::Content => "Content",
            Channel::TypedEdge => "Typed-Edge",
            Channel::EdgeSets => "Edge-Sets",
            Channel::Structural => "Structural",
            Channel::S1Adjacency => "S1_Adjacency",
            Channel::S2Motif => "S2_Motif",
            Channel::S3System => "S3_System",
            Channel::S4Functional => "S4_Functional",
            Channel::StructFused => "S_struct_Fused",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Channel::Total => "total_similarity_matrix.csv",
            Channel::Content => "content_similarity_matrix.csv",
            Channel::TypedEdge => "typed_edge_similarity_matrix.csv",
            Channel::EdgeSets => "edge_sets_similarity_matrix.csv",
            Channel::Structural => "structural_similarity_matrix.csv",
            Channel::S1Adjacency => "S1_adjacency_similarity.csv",
            Channel::S2Motif => "S2_motif_similarity.csv",
            Channel::S3System => "S3_system_similarity.csv",
            Channel::S4Functional => "S4_functional_similarity.csv",
            Channel::StructFused => "S_struct_fused_similarity.csv",
        }
    }

    /// Top-level channels live with the channel matrices, structural
    /// sub-channels with the structural data.
    fn in_channel_dir(self) -> bool {
        matches!(
            self,
            Channel::Total
                | Channel::Content
                | Channel::TypedEdge
                | Channel::EdgeSets
                | Channel::Structural
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const PAIRWISE_TOTAL_FILE: &str = "pairwise_total_summary.csv";
pub const PAIRWISE_STRUCT_FILE: &str = "pairwise_structural_summary.csv";
pub const SYSTEM_SCORES_FILE: &str = "s3_system_scores.csv";
pub const MOTIF_EVIDENCE_FILE: &str = "motif_evidence.json";

/// Tabular structural-pipeline outputs and evidence shown as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceTable {
    S1Inventory,
    S2Motifs,
    S4MotifShare,
    AdjacencyEvidence,
    FunctionalRoles,
}

impl EvidenceTable {
    pub const ALL: [EvidenceTable; 5] = [
        EvidenceTable::S1Inventory,
        EvidenceTable::S2Motifs,
        EvidenceTable::S4MotifShare,
        EvidenceTable::AdjacencyEvidence,
        EvidenceTable::FunctionalRoles,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            EvidenceTable::S1Inventory => "s1_inventory.csv",
            EvidenceTable::S2Motifs => "s2_motifs.csv",
            EvidenceTable::S4MotifShare => "s4_motif_share_vectors.csv",
            EvidenceTable::AdjacencyEvidence => "adjacency_evidence.csv",
            EvidenceTable::FunctionalRoles => "functional_roles_evidence.csv",
        }
    }

    // pipeline stage outputs vs. evidence next to the sub-channel matrices
    fn in_structural_dir(self) -> bool {
        matches!(
            self,
            EvidenceTable::S1Inventory | EvidenceTable::S2Motifs | EvidenceTable::S4MotifShare
        )
    }
}

/// Where the bundle files live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    pub base_dir: PathBuf,
    pub data_dir: PathBuf,
    pub channel_dir: PathBuf,
    pub structural_dir: PathBuf,
    pub reference_dir: PathBuf,
}

impl DatasetLayout {
    /// Defaults: `<base>/data`, `<base>/bundle/CHANNEL_MATRICES`,
    /// `<base>/bundle/STRUCTURAL_PIPELINE`, references directly under
    /// `<base>`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        debug!("Dataset layout rooted at {}", base_dir.display());
        Self {
            data_dir: base_dir.join("data"),
            channel_dir: base_dir.join("bundle").join("CHANNEL_MATRICES"),
            structural_dir: base_dir.join("bundle").join("STRUCTURAL_PIPELINE"),
            reference_dir: base_dir.clone(),
            base_dir,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_channel_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.channel_dir = dir.into();
        self
    }

    pub fn with_structural_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.structural_dir = dir.into();
        self
    }

    pub fn with_reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = dir.into();
        self
    }

    pub fn matrix_path(&self, channel: Channel) -> PathBuf {
        if channel.in_channel_dir() {
            self.channel_dir.join(channel.file_name())
        } else {
            self.data_dir.join(channel.file_name())
        }
    }

    pub fn pairwise_total_path(&self) -> PathBuf {
        self.channel_dir.join(PAIRWISE_TOTAL_FILE)
    }

    pub fn pairwise_struct_path(&self) -> PathBuf {
        self.channel_dir.join(PAIRWISE_STRUCT_FILE)
    }

    pub fn evidence_path(&self, table: EvidenceTable) -> PathBuf {
        if table.in_structural_dir() {
            self.structural_dir.join(table.file_name())
        } else {
            self.data_dir.join(table.file_name())
        }
    }

    pub fn system_scores_path(&self) -> PathBuf {
        self.structural_dir.join(SYSTEM_SCORES_FILE)
    }

    pub fn motif_evidence_path(&self) -> PathBuf {
        self.data_dir.join(MOTIF_EVIDENCE_FILE)
    }

    /// Graph file of a reference model: the first `<model>.<ext>` that
    /// exists, else `<reference_dir>/<model>` as given.
    pub fn reference_graph(&self, model: &str) -> PathBuf {
        GRAPH_EXTENSIONS
            .iter()
            .map(|ext| self.reference_dir.join(format!("{}.{}", model, ext)))
            .find(|p| p.exists())
            .unwrap_or_else(|| self.reference_dir.join(model))
    }
}

/// Loads bundles, memoising every parsed file.
pub struct DatasetLoader {
    layout: DatasetLayout,
    aliases: ColumnAliases,
    matrices: FileCache<SimilarityMatrix>,
    tables: FileCache<PairTable>,
    records: FileCache<RecordTable>,
    json: FileCache<Map<String, Value>>,
}

impl DatasetLoader {
    pub fn new(layout: DatasetLayout) -> Self {
        Self {
            layout,
            aliases: ColumnAliases::default(),
            matrices: FileCache::new(),
            tables: FileCache::new(),
            records: FileCache::new(),
            json: FileCache::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: ColumnAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    /// Absent or malformed → empty, with a warning.
    pub fn matrix(&self, channel: Channel) -> Arc<SimilarityMatrix> {
        let path = self.layout.matrix_path(channel);
        if !path.exists() {
            warn!("{} matrix not available: {}", channel, path.display());
            return Arc::new(SimilarityMatrix::empty());
        }
        self.matrices
            .get_or_load(&path, |bytes| SimilarityMatrix::from_csv_reader(bytes))
            .unwrap_or_else(|e| {
                warn!("Error loading {}: {}", path.display(), e);
                Arc::new(SimilarityMatrix::empty())
            })
    }

    /// Absent file, unknown schema or malformed rows → empty, with a warning.
    pub fn pair_table(&self, path: &Path) -> Arc<PairTable> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !path.exists() {
            warn!("Pair table not available: {}", path.display());
            return Arc::new(PairTable::empty(name));
        }
        self.tables
            .get_or_load(path, |bytes| {
                PairTable::from_csv_reader(&name, bytes, &self.aliases)
            })
            .unwrap_or_else(|e| {
                warn!("Error loading {}: {}", path.display(), e);
                Arc::new(PairTable::empty(name))
            })
    }

    /// Any CSV kept as text. Absent or malformed → empty, with a warning.
    pub fn record_table(&self, path: &Path) -> Arc<RecordTable> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !path.exists() {
            warn!("Table not available: {}", path.display());
            return Arc::new(RecordTable::empty(name));
        }
        self.records
            .get_or_load(path, |bytes| RecordTable::from_csv_reader(&name, bytes))
            .unwrap_or_else(|e| {
                warn!("Error loading {}: {}", path.display(), e);
                Arc::new(RecordTable::empty(name))
            })
    }

    /// Motif evidence object. Absent, malformed or non-object → empty map.
    pub fn motif_evidence(&self) -> Arc<Map<String, Value>> {
        let path = self.layout.motif_evidence_path();
        if !path.exists() {
            warn!("Motif evidence not available: {}", path.display());
            return Arc::new(Map::new());
        }
        self.json
            .get_or_load(&path, json_object_from_slice)
            .unwrap_or_else(|e| {
                warn!("Error loading {}: {}", path.display(), e);
                Arc::new(Map::new())
            })
    }

    pub fn system_scores(&self) -> SystemScoresStatus {
        SystemScoresStatus::from_table(&self.record_table(&self.layout.system_scores_path()))
    }

    pub fn load(&self) -> Dataset {
        info!("Loading similarity bundle from {}", self.layout.base_dir.display());
        let matrices: HashMap<Channel, Arc<SimilarityMatrix>> =
            Channel::ALL.iter().map(|&c| (c, self.matrix(c))).collect();
        let pairwise_total = self.pair_table(&self.layout.pairwise_total_path());
        let pairwise_struct = self.pair_table(&self.layout.pairwise_struct_path());
        let evidence: HashMap<EvidenceTable, Arc<RecordTable>> = EvidenceTable::ALL
            .iter()
            .map(|&t| (t, self.record_table(&self.layout.evidence_path(t))))
            .collect();

        let dataset = Dataset {
            layout: self.layout.clone(),
            matrices,
            pairwise_total,
            pairwise_struct,
            evidence,
            system_scores: self.system_scores(),
            motif_evidence: self.motif_evidence(),
        };
        info!(
            "Bundle loaded: {} models, {}/{} matrices present",
            dataset.models().len(),
            Channel::ALL
                .iter()
                .filter(|&&c| !dataset.matrix(c).is_empty())
                .count(),
            Channel::ALL.len()
        );
        dataset
    }
}

/// A loaded bundle. Read-only.
#[derive(Clone, Debug)]
pub struct Dataset {
    layout: DatasetLayout,
    matrices: HashMap<Channel, Arc<SimilarityMatrix>>,
    pairwise_total: Arc<PairTable>,
    pairwise_struct: Arc<PairTable>,
    evidence: HashMap<EvidenceTable, Arc<RecordTable>>,
    system_scores: SystemScoresStatus,
    motif_evidence: Arc<Map<String, Value>>,
}

impl Dataset {
    pub fn matrix(&self, channel: Channel) -> &SimilarityMatrix {
        self.matrices
            .get(&channel)
            .map(Arc::as_ref)
            .unwrap_or_else(|| empty_matrix())
    }

    /// Model ids, taken from the total matrix.
    pub fn models(&self) -> &[String] {
        self.matrix(Channel::Total).labels()
    }

    pub fn pairwise_total(&self) -> &PairTable {
        &self.pairwise_total
    }

    pub fn pairwise_struct(&self) -> &PairTable {
        &self.pairwise_struct
    }

    /// Empty when the file was absent or unreadable.
    pub fn evidence(&self, table: EvidenceTable) -> &RecordTable {
        static EMPTY: std::sync::OnceLock<RecordTable> = std::sync::OnceLock::new();
        self.evidence
            .get(&table)
            .map(Arc::as_ref)
            .unwrap_or_else(|| EMPTY.get_or_init(RecordTable::default))
    }

    pub fn system_scores(&self) -> &SystemScoresStatus {
        &self.system_scores
    }

    pub fn motif_evidence(&self) -> &Map<String, Value> {
        &self.motif_evidence
    }

    /// Top-N most similar models by total similarity.
    pub fn top_matches(&self, model: &str, n: usize) -> Vec<RankedMatch> {
        self.matrix(Channel::Total).top_n(model, n)
    }

    /// Per-channel detail for the top-N matches of `model`, from the pairwise
    /// total table. Empty when that table is unavailable.
    pub fn top_breakdown(&self, model: &str, n: usize) -> Vec<BreakdownRow> {
        let top = self.top_matches(model, n);
        let others: Vec<&str> = top.iter().map(|m| m.model.as_str()).collect();
        channel_breakdown(&self.pairwise_total, model, &others)
    }

    /// Similarity of `a` and `b` under every channel that knows both.
    pub fn compare_pair(&self, a: &str, b: &str) -> Vec<(Channel, f64)> {
        Channel::PAIR_COMPARISON
            .iter()
            .filter_map(|&c| self.matrix(c).get(a, b).map(|v| (c, v)))
            .collect()
    }

    /// Diagnostics for every matrix, missing ones included.
    pub fn verification_report(&self) -> Vec<VerificationRow> {
        verify_all(Channel::ALL.iter().map(|&c| (c.label(), self.matrix(c))))
    }

    /// Recomputes totals from the pairwise tables.
    pub fn fused_scores(&self, weights: &FusionWeights) -> Vec<FusedPair> {
        fuse(&self.pairwise_total, &self.pairwise_struct, weights)
    }

    /// Content-only comparison of an uploaded graph against the models'
    /// reference graphs.
    pub fn quick_compare(
        &self,
        parser: &GraphParser,
        upload: &GraphSource,
        top_n: usize,
    ) -> Result<QuickCompare> {
        let references: Vec<(String, GraphSource)> = self
            .models()
            .iter()
            .map(|m| (m.clone(), GraphSource::Path(self.layout.reference_graph(m))))
            .collect();
        compare_to_references(parser, upload, &references, top_n)
    }
}

fn empty_matrix() -> &'static SimilarityMatrix {
    static EMPTY: std::sync::OnceLock<SimilarityMatrix> = std::sync::OnceLock::new();
    EMPTY.get_or_init(SimilarityMatrix::empty)
}
