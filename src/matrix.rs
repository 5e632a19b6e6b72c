//! Labelled square similarity matrices produced by the external pipeline.
//!
//! On disk a matrix is a CSV table whose header row is `<index>,id_1,..,id_n`
//! and whose rows are `id_i,v_i1,..,v_in`. Row labels must repeat the header
//! labels in the same order. Values are stored row-major in a smartcore
//! `DenseMatrix`.
//!
//! An empty matrix stands for "not available": it is what the loaders return
//! for absent files and what [`crate::verify::verify`] reports as missing.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use smartcore::linalg::basic::arrays::{Array, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;

use log::{debug, info, trace, warn};

use crate::errors::{GraphSimError, Result};
use crate::similarity::{RankedMatch, top_n_stable};

#[derive(Clone, Debug, Default)]
pub struct SimilarityMatrix {
    labels: Vec<String>,
    // `None` iff `labels` is empty
    data: Option<DenseMatrix<f64>>,
}

impl SimilarityMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds from row vectors that share the label order of `labels`.
    pub fn from_rows(labels: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = labels.len();
        if rows.len() != n {
            return Err(GraphSimError::schema(format!(
                "{} labels but {} rows",
                n,
                rows.len()
            )));
        }
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(GraphSimError::schema(format!(
                "row '{}' has {} values, expected {}",
                labels[i],
                r.len(),
                n
            )));
        }
        if n == 0 {
            return Ok(Self::empty());
        }
        let data = DenseMatrix::from_iterator(rows.into_iter().flatten(), n, n, 0);
        Ok(Self {
            labels,
            data: Some(data),
        })
    }

    /// Reads the CSV layout described in the module docs.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let labels: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        trace!("Matrix header labels: {:?}", labels);

        let mut rows = Vec::with_capacity(labels.len());
        for (r, record) in rdr.records().enumerate() {
            let record = record?;
            let row_label = record.get(0).unwrap_or_default();
            match labels.get(r) {
                Some(expected) if expected == row_label => {}
                Some(expected) => {
                    return Err(GraphSimError::schema(format!(
                        "row {} is labelled '{}' but column {} is '{}'",
                        r, row_label, r, expected
                    )));
                }
                None => {
                    return Err(GraphSimError::schema(format!(
                        "extra row '{}' beyond {} columns",
                        row_label,
                        labels.len()
                    )));
                }
            }
            let values = record
                .iter()
                .skip(1)
                .enumerate()
                .map(|(c, cell)| {
                    cell.parse::<f64>().map_err(|_| {
                        GraphSimError::schema(format!(
                            "cell ({}, {}) is not a number: '{}'",
                            row_label,
                            labels.get(c).map(String::as_str).unwrap_or("?"),
                            cell
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(values);
        }
        Self::from_rows(labels, rows)
    }

    /// Absent file → `MissingData`.
    pub fn load_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GraphSimError::MissingData {
                path: path.to_path_buf(),
            });
        }
        info!("Loading similarity matrix {}", path.display());
        let m = Self::from_csv_reader(File::open(path)?)?;
        debug!("Matrix {} loaded: {}x{}", path.display(), m.len(), m.len());
        Ok(m)
    }

    /// Absent file → empty matrix. Malformed content is still an error.
    pub fn load_or_missing(path: &Path) -> Result<Self> {
        match Self::load_csv(path) {
            Err(e @ GraphSimError::MissingData { .. }) => {
                warn!("Matrix not available: {}", e);
                Ok(Self::empty())
            }
            other => other,
        }
    }

    /// Number of models (rows == columns).
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, model: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == model)
    }

    /// Value at (row, col) by position.
    ///
    /// # Panics
    ///
    /// Panics on out-of-bounds indices.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.len() && j < self.len(), "Index out of bounds");
        match &self.data {
            Some(d) => *d.get((i, j)),
            None => unreachable!("non-empty matrix always holds data"),
        }
    }

    /// Value for a labelled pair, if both models are known.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.at(i, j))
    }

    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.len()).map(|j| self.at(i, j)).collect()
    }

    /// Iterates all values row-major.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.len();
        (0..n * n).map(move |k| self.at(k / n, k % n))
    }

    /// Models most similar to `model` by this matrix, self excluded.
    ///
    /// Unknown model or empty matrix gives an empty result.
    pub fn top_n(&self, model: &str, n: usize) -> Vec<RankedMatch> {
        let Some(i) = self.index_of(model) else {
            return Vec::new();
        };
        let others = (0..self.len())
            .filter(|&j| j != i)
            .map(|j| RankedMatch::new(self.labels[j].clone(), self.at(i, j)))
            .collect();
        top_n_stable(others, n)
    }

    /// `1 - M` with a zeroed diagonal: the input a hierarchical clustering
    /// (dendrogram) of the models needs.
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.len();
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { 0.0 } else { 1.0 - self.at(i, j) })
                    .collect()
            })
            .collect()
    }

    /// The underlying smartcore matrix, `None` when empty.
    pub fn dense(&self) -> Option<&DenseMatrix<f64>> {
        self.data.as_ref()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.as_ref().map(|d| d.shape()).unwrap_or((0, 0))
    }
}
