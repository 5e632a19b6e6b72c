//! Structural sanity checks for precomputed similarity matrices.
//!
//! A valid similarity matrix is symmetric, has a unit diagonal and keeps every
//! entry inside `[0, 1]`. Each property is reported separately; a matrix that
//! fails one is still usable for display, it is only flagged.
//!
//! Equality checks use the `allclose` rule `|a - b| <= atol + rtol * |b|` with
//! `atol = 1e-8` and `rtol = 1e-5`. Range checks allow `1e-9` of slack on both
//! ends.
use serde::{Deserialize, Serialize};

use log::{debug, info};

use crate::matrix::SimilarityMatrix;

pub const SYMMETRY_TOL: f64 = 1e-8;
pub const DIAGONAL_TOL: f64 = 1e-8;
pub const RELATIVE_TOL: f64 = 1e-5;
pub const RANGE_SLACK: f64 = 1e-9;

#[inline]
fn close(a: f64, b: f64, atol: f64) -> bool {
    (a - b).abs() <= atol + RELATIVE_TOL * b.abs()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixChecks {
    pub symmetric: bool,
    pub unit_diagonal: bool,
    pub in_range: bool,
}

impl MatrixChecks {
    pub fn overall(&self) -> bool {
        self.symmetric && self.unit_diagonal && self.in_range
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixVerification {
    /// No data to check.
    Missing,
    Checked(MatrixChecks),
}

impl MatrixVerification {
    /// `false` for a missing matrix.
    pub fn is_valid(&self) -> bool {
        match self {
            MatrixVerification::Missing => false,
            MatrixVerification::Checked(c) => c.overall(),
        }
    }

    pub fn checks(&self) -> Option<MatrixChecks> {
        match self {
            MatrixVerification::Missing => None,
            MatrixVerification::Checked(c) => Some(*c),
        }
    }
}

/// Runs the three checks. Never mutates or repairs the matrix.
pub fn verify(matrix: &SimilarityMatrix) -> MatrixVerification {
    let n = matrix.len();
    if n == 0 {
        return MatrixVerification::Missing;
    }

    let mut symmetric = true;
    let mut unit_diagonal = true;
    let mut in_range = true;
    for i in 0..n {
        for j in 0..n {
            let v = matrix.at(i, j);
            // NaN is out of range and close to nothing
            if !(-RANGE_SLACK..=1.0 + RANGE_SLACK).contains(&v) {
                in_range = false;
            }
            if i == j {
                if !close(v, 1.0, DIAGONAL_TOL) {
                    unit_diagonal = false;
                }
            } else if !close(v, matrix.at(j, i), SYMMETRY_TOL) {
                symmetric = false;
            }
        }
    }

    let checks = MatrixChecks {
        symmetric,
        unit_diagonal,
        in_range,
    };
    debug!("Verified {}x{} matrix: {:?}", n, n, checks);
    MatrixVerification::Checked(checks)
}

/// One line of the diagnostics table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationRow {
    pub name: String,
    pub outcome: MatrixVerification,
}

/// Verifies every named matrix, in the order given.
pub fn verify_all<'a, I>(matrices: I) -> Vec<VerificationRow>
where
    I: IntoIterator<Item = (&'a str, &'a SimilarityMatrix)>,
{
    let rows: Vec<VerificationRow> = matrices
        .into_iter()
        .map(|(name, m)| VerificationRow {
            name: name.to_string(),
            outcome: verify(m),
        })
        .collect();
    info!(
        "Verified {} matrices: {} valid, {} missing",
        rows.len(),
        rows.iter().filter(|r| r.outcome.is_valid()).count(),
        rows.iter()
            .filter(|r| r.outcome == MatrixVerification::Missing)
            .count()
    );
    rows
}
