use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::features::{FeatureVector, N_FEATURES};
use crate::parser::{GraphParser, GraphSource};
use crate::similarity::{RankedMatch, compare_to_references, rank_by_similarity};
use crate::tests::test_data::{GARBAGE, WALL_RDF_XML, WALLS_TTL, ZONES_TTL, write_file};

fn fv(counts: [f64; N_FEATURES]) -> FeatureVector {
    FeatureVector::from_counts(counts)
}

fn candidates() -> Vec<(String, FeatureVector)> {
    vec![
        ("orthogonal".to_string(), fv([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
        ("same".to_string(), fv([2.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])),
        ("partial".to_string(), fv([1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
        ("empty".to_string(), fv([0.0; N_FEATURES])),
    ]
}

#[test]
fn ranks_descending() {
    let query = fv([2.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    let ranked = rank_by_similarity(&query, &candidates(), 10);

    let names: Vec<&str> = ranked.iter().map(|m| m.model.as_str()).collect();
    assert_eq!(names[0], "same");
    assert_eq!(names[1], "partial");
    assert_relative_eq!(ranked[0].score, 1.0, epsilon = 1e-12);
    for w in ranked.windows(2) {
        assert!(w[0].score >= w[1].score);
    }
    // zero vector scores 0.0, not NaN
    let empty = ranked.iter().find(|m| m.model == "empty").unwrap();
    assert_eq!(empty.score, 0.0);
}

#[test]
fn ties_keep_input_order() {
    let query = fv([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    // both score 0.0 against the query
    let cands = candidates();
    let ranked = rank_by_similarity(&query, &cands, 10);
    let zeros: Vec<&str> = ranked
        .iter()
        .filter(|m| m.score == 0.0)
        .map(|m| m.model.as_str())
        .collect();
    assert_eq!(zeros, vec!["orthogonal", "empty"]);
}

#[test]
fn result_length_is_min_of_top_n_and_candidates() {
    let query = fv([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    let cands = candidates();
    for top_n in 0..6 {
        let ranked = rank_by_similarity(&query, &cands, top_n);
        assert_eq!(ranked.len(), top_n.min(cands.len()));
    }
    assert!(rank_by_similarity(&query, &[], 5).is_empty());
}

#[test]
fn random_rankings_are_sorted_and_bounded() {
    let mut rng = StdRng::seed_from_u64(7);
    let random_fv = |rng: &mut StdRng| {
        let mut counts = [0.0; N_FEATURES];
        for c in counts.iter_mut() {
            *c = rng.random_range(0..5) as f64;
        }
        fv(counts)
    };
    let query = random_fv(&mut rng);
    let cands: Vec<(String, FeatureVector)> = (0..50)
        .map(|i| (format!("m{i}"), random_fv(&mut rng)))
        .collect();

    let ranked = rank_by_similarity(&query, &cands, 20);
    assert_eq!(ranked.len(), 20);
    for w in ranked.windows(2) {
        assert!(w[0].score >= w[1].score);
        if w[0].score == w[1].score {
            let pos = |m: &RankedMatch| cands.iter().position(|(id, _)| *id == m.model).unwrap();
            assert!(pos(&w[0]) < pos(&w[1]), "tie broke input order");
        }
    }
    assert!(ranked.iter().all(|m| (-1.0..=1.0).contains(&m.score)));
}

#[test]
fn quick_compare_skips_unparseable_references() {
    let dir = tempfile::tempdir().unwrap();
    let walls = write_file(dir.path(), "walls.ttl", WALLS_TTL);
    let zones = write_file(dir.path(), "zones.ttl", ZONES_TTL);
    let wall_xml = write_file(dir.path(), "wall.rdf", WALL_RDF_XML);
    let broken = write_file(dir.path(), "broken.ttl", GARBAGE);

    let refs = vec![
        ("walls".to_string(), GraphSource::Path(walls)),
        ("broken".to_string(), GraphSource::Path(broken)),
        ("zones".to_string(), GraphSource::Path(zones)),
        ("wall_xml".to_string(), GraphSource::Path(wall_xml)),
        ("absent".to_string(), GraphSource::Path(dir.path().join("absent.ttl"))),
    ];

    let out = compare_to_references(
        &GraphParser::default(),
        &GraphSource::Bytes(WALLS_TTL.into()),
        &refs,
        5,
    )
    .unwrap();

    assert_eq!(out.skipped, vec!["broken".to_string(), "absent".to_string()]);
    assert_eq!(out.matches.len(), 3);
    assert_eq!(out.matches[0].model, "walls");
    assert_relative_eq!(out.matches[0].score, 1.0, epsilon = 1e-12);
    assert!(!out.is_empty());
}

#[test]
fn quick_compare_fails_on_bad_query() {
    let refs = vec![("walls".to_string(), GraphSource::Bytes(WALLS_TTL.into()))];
    let res = compare_to_references(
        &GraphParser::default(),
        &GraphSource::Bytes(GARBAGE.into()),
        &refs,
        3,
    );
    assert!(res.is_err());
}
