use crate::matrix::SimilarityMatrix;
use crate::tests::test_data::{TOTAL_MATRIX_CSV, labels, random_valid_matrix};
use crate::verify::{MatrixChecks, MatrixVerification, verify, verify_all};

fn three(rows: Vec<Vec<f64>>) -> SimilarityMatrix {
    SimilarityMatrix::from_rows(labels(&["A", "B", "C"]), rows).unwrap()
}

fn valid_rows() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 0.4, 0.7],
        vec![0.4, 1.0, 0.2],
        vec![0.7, 0.2, 1.0],
    ]
}

const ALL_OK: MatrixChecks = MatrixChecks {
    symmetric: true,
    unit_diagonal: true,
    in_range: true,
};

#[test]
fn valid_matrix_passes_every_check() {
    let out = verify(&three(valid_rows()));
    assert_eq!(out, MatrixVerification::Checked(ALL_OK));
    assert!(out.is_valid());

    let csv = SimilarityMatrix::from_csv_reader(TOTAL_MATRIX_CSV.as_bytes()).unwrap();
    assert!(verify(&csv).is_valid());
}

#[test]
fn asymmetry_is_detected() {
    let mut rows = valid_rows();
    rows[0][2] = 0.71;
    let checks = verify(&three(rows)).checks().unwrap();
    assert!(!checks.symmetric);
    assert!(checks.unit_diagonal);
    assert!(checks.in_range);
    assert!(!checks.overall());
}

#[test]
fn tiny_asymmetry_is_tolerated() {
    let mut rows = valid_rows();
    rows[0][2] += 1e-9;
    assert!(verify(&three(rows)).checks().unwrap().symmetric);
}

#[test]
fn bad_diagonal_is_detected() {
    let mut rows = valid_rows();
    rows[1][1] = 0.5;
    let checks = verify(&three(rows)).checks().unwrap();
    assert!(!checks.unit_diagonal);
    assert!(checks.symmetric);
    assert!(checks.in_range);
}

#[test]
fn out_of_range_entry_is_detected() {
    let mut rows = valid_rows();
    rows[0][1] = 1.5;
    rows[1][0] = 1.5;
    let checks = verify(&three(rows)).checks().unwrap();
    assert!(!checks.in_range);
    assert!(checks.symmetric);

    let mut rows = valid_rows();
    rows[1][2] = -0.1;
    rows[2][1] = -0.1;
    assert!(!verify(&three(rows)).checks().unwrap().in_range);
}

#[test]
fn range_allows_rounding_slack() {
    let mut rows = valid_rows();
    rows[1][2] = -1e-10;
    rows[2][1] = -1e-10;
    assert!(verify(&three(rows)).is_valid());
}

#[test]
fn nan_fails_checks() {
    let mut rows = valid_rows();
    rows[0][1] = f64::NAN;
    let checks = verify(&three(rows)).checks().unwrap();
    assert!(!checks.in_range);
    assert!(!checks.symmetric);
}

#[test]
fn empty_matrix_is_missing() {
    let out = verify(&SimilarityMatrix::empty());
    assert_eq!(out, MatrixVerification::Missing);
    assert!(!out.is_valid());
    assert!(out.checks().is_none());
}

#[test]
fn random_valid_matrices_pass() {
    for seed in 0..5 {
        let m = random_valid_matrix(12, seed);
        assert!(verify(&m).is_valid(), "seed {seed}");
    }
}

#[test]
fn verify_all_keeps_order() {
    let valid = three(valid_rows());
    let mut rows = valid_rows();
    rows[2][2] = 0.0;
    let bad = three(rows);
    let empty = SimilarityMatrix::empty();

    let report = verify_all([("Total", &valid), ("Content", &bad), ("Edge-Sets", &empty)]);
    let names: Vec<&str> = report.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Total", "Content", "Edge-Sets"]);
    assert!(report[0].outcome.is_valid());
    assert!(!report[1].outcome.is_valid());
    assert_eq!(report[2].outcome, MatrixVerification::Missing);
}
