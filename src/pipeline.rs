//! Structural-pipeline outputs and evidence tables shipped with the bundle.
//!
//! These are read as data and exposed as is, apart from the system-family
//! scores, which feed a four-axis radar and therefore need the `Frame`,
//! `Wall`, `Dual` and `Braced` columns.
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use log::{debug, info, trace, warn};

use crate::errors::{GraphSimError, Result};
use crate::schema::pick_first_present;

/// Radar axes of the system-family scores, in plotting order.
pub const SYSTEM_AXES: [&str; 4] = ["Frame", "Wall", "Dual", "Braced"];

pub const MODEL_COLUMN: &str = "model";

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A CSV table kept as trimmed text cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_csv_reader<R: Read>(name: &str, reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, _>>()?;
        debug!("Table '{}': {} columns, {} rows", name, headers.len(), rows.len());
        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    /// Absent, unreadable or malformed → empty table, with a warning.
    pub fn load_or_empty(path: &Path) -> Self {
        let name = table_name(path);
        if !path.exists() {
            warn!("Table not available: {}", path.display());
            return Self::empty(name);
        }
        File::open(path)
            .map_err(GraphSimError::from)
            .and_then(|f| Self::from_csv_reader(&name, f))
            .unwrap_or_else(|e| {
                warn!("Error loading {}: {}", path.display(), e);
                Self::empty(name)
            })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        pick_first_present(&[name], &self.headers)
    }

    /// Cells of one column; short rows yield `""`.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let i = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.get(i).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// Per-model system-family scores, one value per [`SYSTEM_AXES`] entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemScores {
    pub rows: Vec<SystemScoreRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemScoreRow {
    pub model: String,
    pub values: [f64; 4],
}

impl SystemScores {
    /// Fails with `MissingColumns` naming every absent axis (and `model`),
    /// plus the columns the table does have.
    pub fn from_table(table: &RecordTable) -> Result<Self> {
        let wanted: Vec<&str> = std::iter::once(MODEL_COLUMN).chain(SYSTEM_AXES).collect();
        let positions: Vec<Option<usize>> =
            wanted.iter().map(|c| table.column_index(c)).collect();
        let missing: Vec<String> = wanted
            .iter()
            .zip(&positions)
            .filter(|(_, p)| p.is_none())
            .map(|(c, _)| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GraphSimError::MissingColumns {
                table: table.name.clone(),
                missing,
                available: table.headers.clone(),
            });
        }
        let idx: Vec<usize> = positions.into_iter().flatten().collect();

        let mut rows = Vec::with_capacity(table.len());
        for record in &table.rows {
            let cell = |i: usize| record.get(i).map(String::as_str).unwrap_or("");
            let mut values = [0.0; 4];
            for (v, &i) in values.iter_mut().zip(&idx[1..]) {
                *v = cell(i).parse::<f64>().map_err(|_| {
                    GraphSimError::schema(format!(
                        "system score '{}' of model '{}' is not a number",
                        cell(i),
                        cell(idx[0])
                    ))
                })?;
            }
            rows.push(SystemScoreRow {
                model: cell(idx[0]).to_string(),
                values,
            });
        }
        trace!("System scores for {} models", rows.len());
        Ok(Self { rows })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row for `model`.
    pub fn get(&self, model: &str) -> Option<&[f64; 4]> {
        self.rows.iter().find(|r| r.model == model).map(|r| &r.values)
    }

    /// Radar polygon of `model`: the four values with the first repeated to
    /// close the outline.
    pub fn closed_trace(&self, model: &str) -> Option<[f64; 5]> {
        let v = self.get(model)?;
        Some([v[0], v[1], v[2], v[3], v[0]])
    }
}

/// What the system-score radar can show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SystemScoresStatus {
    /// No score table in the bundle.
    #[default]
    Unavailable,
    /// The table exists but lacks radar columns.
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
    Available(SystemScores),
}

impl SystemScoresStatus {
    pub fn from_table(table: &RecordTable) -> Self {
        if table.is_empty() {
            return SystemScoresStatus::Unavailable;
        }
        match SystemScores::from_table(table) {
            Ok(scores) => SystemScoresStatus::Available(scores),
            Err(GraphSimError::MissingColumns {
                missing, available, ..
            }) => {
                warn!("System scores unusable, missing columns {:?}", missing);
                SystemScoresStatus::MissingColumns { missing, available }
            }
            Err(e) => {
                warn!("System scores unusable: {}", e);
                SystemScoresStatus::Unavailable
            }
        }
    }

    pub fn scores(&self) -> Option<&SystemScores> {
        match self {
            SystemScoresStatus::Available(s) => Some(s),
            _ => None,
        }
    }
}

/// Parses a JSON document whose top level must be an object.
pub fn json_object_from_slice(bytes: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        other => Err(GraphSimError::schema(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reads a JSON object. Absent file, bad JSON or a non-object top level →
/// empty map, with a warning.
pub fn load_json_or_empty(path: &Path) -> Map<String, Value> {
    if !path.exists() {
        warn!("JSON not available: {}", path.display());
        return Map::new();
    }
    match fs::read(path)
        .map_err(GraphSimError::from)
        .and_then(|b| json_object_from_slice(&b))
    {
        Ok(map) => {
            info!("Loaded {} ({} keys)", path.display(), map.len());
            map
        }
        Err(e) => {
            warn!("Error loading {}: {}", path.display(), e);
            Map::new()
        }
    }
}
