//! Column-alias resolution for pairwise channel-score tables.
//!
//! The upstream pipeline has written pair tables under several header
//! spellings (`model_a` / `model_A` / `A`, `S_content` / `content`, ...). Each
//! logical field owns a ranked alias list, kept as configuration data in
//! [`ColumnAliases`]; a table's header is resolved once against it at load
//! time and the rows are stored under a canonical schema ([`PairRecord`]).
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use log::{debug, info, trace, warn};

use crate::errors::{GraphSimError, Result};

/// Case-insensitive, whitespace-trimmed lookup of the first candidate present
/// in `columns`. Returns the column index.
///
/// ```
/// use graphsim::schema::pick_first_present;
/// let cols = ["Model_A", " model_b ", "S_total"];
/// assert_eq!(pick_first_present(&["model_a", "A"], &cols), Some(0));
/// assert_eq!(pick_first_present(&["missing", "MODEL_B"], &cols), Some(1));
/// assert_eq!(pick_first_present(&["nope"], &cols), None);
/// ```
pub fn pick_first_present<C, S>(candidates: &[C], columns: &[S]) -> Option<usize>
where
    C: AsRef<str>,
    S: AsRef<str>,
{
    let normalised: Vec<String> = columns
        .iter()
        .map(|c| c.as_ref().trim().to_lowercase())
        .collect();
    candidates.iter().find_map(|cand| {
        let key = cand.as_ref().trim().to_lowercase();
        normalised.iter().position(|c| *c == key)
    })
}

/// Ranked header spellings per logical field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAliases {
    pub model_a: Vec<String>,
    pub model_b: Vec<String>,
    pub total: Vec<String>,
    pub content: Vec<String>,
    pub typed: Vec<String>,
    pub edge: Vec<String>,
    pub structural: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            model_a: owned(&["model_a", "model_A", "A"]),
            model_b: owned(&["model_b", "model_B", "B"]),
            total: owned(&["S_total", "total"]),
            content: owned(&["S_content", "content"]),
            typed: owned(&["S_typed", "typed"]),
            edge: owned(&["S_edge", "edge"]),
            structural: owned(&["S_struct", "struct", "structural"]),
        }
    }
}

/// Per-channel values of one pair row; `None` when the table has no such
/// column or the cell is blank / non-numeric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelValues {
    pub total: Option<f64>,
    pub content: Option<f64>,
    pub typed: Option<f64>,
    pub edge: Option<f64>,
    pub structural: Option<f64>,
}

impl ChannelValues {
    pub fn get(&self, field: ScoreField) -> Option<f64> {
        match field {
            ScoreField::Total => self.total,
            ScoreField::Content => self.content,
            ScoreField::Typed => self.typed,
            ScoreField::Edge => self.edge,
            ScoreField::Structural => self.structural,
        }
    }
}

/// The score columns a pair table may carry, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreField {
    Total,
    Content,
    Typed,
    Edge,
    Structural,
}

impl ScoreField {
    pub const ORDER: [ScoreField; 5] = [
        ScoreField::Total,
        ScoreField::Content,
        ScoreField::Typed,
        ScoreField::Edge,
        ScoreField::Structural,
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    pub model_a: String,
    pub model_b: String,
    pub scores: ChannelValues,
}

impl PairRecord {
    pub fn involves(&self, model: &str) -> bool {
        self.model_a == model || self.model_b == model
    }

    /// The other side of the pair when `model` is one side.
    pub fn other(&self, model: &str) -> Option<&str> {
        if self.model_a == model {
            Some(&self.model_b)
        } else if self.model_b == model {
            Some(&self.model_a)
        } else {
            None
        }
    }
}

/// Column positions of a header, resolved against [`ColumnAliases`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ResolvedColumns {
    model_a: usize,
    model_b: usize,
    total: Option<usize>,
    content: Option<usize>,
    typed: Option<usize>,
    edge: Option<usize>,
    structural: Option<usize>,
}

impl ResolvedColumns {
    fn score_fields(&self) -> Vec<ScoreField> {
        ScoreField::ORDER
            .into_iter()
            .filter(|f| match f {
                ScoreField::Total => self.total.is_some(),
                ScoreField::Content => self.content.is_some(),
                ScoreField::Typed => self.typed.is_some(),
                ScoreField::Edge => self.edge.is_some(),
                ScoreField::Structural => self.structural.is_some(),
            })
            .collect()
    }

    fn resolve(table: &str, header: &[String], aliases: &ColumnAliases) -> Result<Self> {
        let required = |field: &str, names: &[String]| {
            pick_first_present(names, header).ok_or_else(|| GraphSimError::SchemaMismatch {
                table: table.to_string(),
                field: field.to_string(),
            })
        };
        let resolved = Self {
            model_a: required("model_a", &aliases.model_a)?,
            model_b: required("model_b", &aliases.model_b)?,
            total: pick_first_present(&aliases.total, header),
            content: pick_first_present(&aliases.content, header),
            typed: pick_first_present(&aliases.typed, header),
            edge: pick_first_present(&aliases.edge, header),
            structural: pick_first_present(&aliases.structural, header),
        };
        trace!("Resolved columns of '{}': {:?}", table, resolved);
        Ok(resolved)
    }
}

/// A pairwise channel-score table in canonical schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairTable {
    pub name: String,
    pub rows: Vec<PairRecord>,
    /// Score columns present in the source, in [`ScoreField::ORDER`].
    #[serde(default)]
    pub fields: Vec<ScoreField>,
}

impl PairTable {
    /// Score columns are taken to be those with a value in some row.
    pub fn new(name: impl Into<String>, rows: Vec<PairRecord>) -> Self {
        let fields = ScoreField::ORDER
            .into_iter()
            .filter(|&f| rows.iter().any(|r| r.scores.get(f).is_some()))
            .collect();
        Self {
            name: name.into(),
            rows,
            fields,
        }
    }

    /// First score column present, the one listings are ranked by.
    pub fn primary_field(&self) -> Option<ScoreField> {
        self.fields.first().copied()
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairRecord> {
        self.rows.iter()
    }

    /// Reads a CSV table; fails with `SchemaMismatch` when either model
    /// column cannot be found under any alias.
    pub fn from_csv_reader<R: Read>(
        name: &str,
        reader: R,
        aliases: &ColumnAliases,
    ) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let cols = ResolvedColumns::resolve(name, &header, aliases)?;

        let cell = |record: &csv::StringRecord, idx: Option<usize>| -> Option<f64> {
            idx.and_then(|i| record.get(i))
                .and_then(|s| s.parse::<f64>().ok())
        };

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let (Some(a), Some(b)) = (record.get(cols.model_a), record.get(cols.model_b)) else {
                trace!("Skipping short row in '{}': {:?}", name, record);
                continue;
            };
            rows.push(PairRecord {
                model_a: a.to_string(),
                model_b: b.to_string(),
                scores: ChannelValues {
                    total: cell(&record, cols.total),
                    content: cell(&record, cols.content),
                    typed: cell(&record, cols.typed),
                    edge: cell(&record, cols.edge),
                    structural: cell(&record, cols.structural),
                },
            });
        }
        debug!("Pair table '{}': {} rows", name, rows.len());
        Ok(Self {
            name: name.to_string(),
            rows,
            fields: cols.score_fields(),
        })
    }

    pub fn load_csv(path: &Path, aliases: &ColumnAliases) -> Result<Self> {
        if !path.exists() {
            return Err(GraphSimError::MissingData {
                path: path.to_path_buf(),
            });
        }
        info!("Loading pair table {}", path.display());
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_csv_reader(&name, File::open(path)?, aliases)
    }

    /// Absent file or unrecognisable schema → empty table, so callers can
    /// fall back to matrix-derived values.
    pub fn load_or_empty(path: &Path, aliases: &ColumnAliases) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match Self::load_csv(path, aliases) {
            Err(e) if e.is_recoverable_absence() => {
                warn!("Pair table {} unusable: {}", path.display(), e);
                Ok(Self::empty(name))
            }
            other => other,
        }
    }
}
