use approx::assert_relative_eq;

use crate::features::{
    FEATURE_PREFIX, FeatureVector, N_FEATURES, PredicateKey, extract_features, fingerprint,
};
use crate::parser::{GraphSource, Triple, TripleSet, parse};
use crate::tests::test_data::{GARBAGE, WALL_RDF_XML, WALLS_TTL};
use crate::tests::{EPS, ZERO_COUNTS};

fn triples(preds: &[&str]) -> TripleSet {
    preds
        .iter()
        .enumerate()
        .map(|(i, p)| Triple::new(format!("<urn:s{i}>"), *p, format!("<urn:o{i}>")))
        .collect()
}

#[test]
fn worked_example_adjacency_and_function() {
    let set: TripleSet = vec![
        Triple::new("<urn:s1>", "http://x.org/o#adjacentElement", "<urn:o1>"),
        Triple::new("<urn:s1>", "http://x.org/o#adjacentElement", "<urn:o2>"),
        Triple::new("<urn:s2>", "http://x.org/o#hasFunction", "<urn:o3>"),
    ]
    .into_iter()
    .collect();

    let fv = extract_features(&set);

    assert_eq!(fv.count(PredicateKey::AdjacentElement), 2.0);
    assert_eq!(fv.count(PredicateKey::HasFunction), 1.0);
    let norm = 5.0_f64.sqrt();
    assert_relative_eq!(fv.get(PredicateKey::AdjacentElement), 2.0 / norm, epsilon = EPS);
    assert_relative_eq!(fv.get(PredicateKey::HasFunction), 1.0 / norm, epsilon = EPS);
    assert_relative_eq!(fv.get(PredicateKey::AdjacentElement), 0.894, epsilon = 1e-3);
    assert_relative_eq!(fv.get(PredicateKey::HasFunction), 0.447, epsilon = 1e-3);
    for key in [
        PredicateKey::AdjacentZone,
        PredicateKey::Bfo0000178,
        PredicateKey::HasQuality,
        PredicateKey::IntersectingElement,
        PredicateKey::RdfType,
    ] {
        assert_eq!(fv.get(key), 0.0, "{key} should be zero");
    }
}

#[test]
fn suffix_match_is_case_insensitive() {
    assert_eq!(
        PredicateKey::from_predicate("HTTP://X.ORG/O#ADJACENTZONE"),
        Some(PredicateKey::AdjacentZone)
    );
    assert_eq!(
        PredicateKey::from_predicate("http://purl.obolibrary.org/obo/BFO_0000178"),
        Some(PredicateKey::Bfo0000178)
    );
    assert_eq!(
        PredicateKey::from_predicate("http://x.org/o/intersectingelement"),
        Some(PredicateKey::IntersectingElement)
    );
}

#[test]
fn type_is_only_a_fallback() {
    assert_eq!(
        PredicateKey::from_predicate("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
        Some(PredicateKey::RdfType)
    );
    assert_eq!(
        PredicateKey::from_predicate("http://x.org/vocab/Type"),
        Some(PredicateKey::RdfType)
    );
    // suffix must follow a separator
    assert_eq!(PredicateKey::from_predicate("http://x.org/o#prototype"), None);
    assert_eq!(PredicateKey::from_predicate("http://x.org/o#hasFunctionType"), None);
}

#[test]
fn unmatched_predicates_are_ignored() {
    let fv = extract_features(&triples(&[
        "http://www.w3.org/2000/01/rdf-schema#label",
        "http://x.org/o#hasMaterial",
    ]));
    assert!(fv.is_zero());
    assert_eq!(fv.values(), &ZERO_COUNTS[..]);
    assert_eq!(fv.norm(), 0.0);
}

#[test]
fn empty_graph_gives_zero_vector() {
    let fv = extract_features(&TripleSet::default());
    assert!(fv.is_zero());
    assert!(fv.values().iter().all(|&v| v == 0.0));
}

#[test]
fn unit_norm_for_nonzero_counts() {
    let fv = extract_features(&parse(&GraphSource::Bytes(WALLS_TTL.into())).unwrap());
    assert!(!fv.is_zero());
    assert_relative_eq!(fv.norm(), 1.0, epsilon = EPS);

    // a, adjacentElement x2, hasFunction, adjacentZone, BFO_0000178
    assert_eq!(fv.count(PredicateKey::RdfType), 1.0);
    assert_eq!(fv.count(PredicateKey::AdjacentElement), 2.0);
    assert_eq!(fv.count(PredicateKey::HasFunction), 1.0);
    assert_eq!(fv.count(PredicateKey::AdjacentZone), 1.0);
    assert_eq!(fv.count(PredicateKey::Bfo0000178), 1.0);
    assert_eq!(fv.counts().iter().sum::<f64>(), 6.0);
}

#[test]
fn extraction_is_idempotent_and_order_free() {
    let preds = [
        "urn:o#hasQuality",
        "urn:o#adjacentElement",
        "urn:o#hasQuality",
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
    ];
    let forward = triples(&preds);
    let mut reversed_preds = preds;
    reversed_preds.reverse();
    let backward = triples(&reversed_preds);

    let a = extract_features(&forward);
    let b = extract_features(&forward);
    let c = extract_features(&backward);

    // bit-identical
    assert_eq!(a.values(), b.values());
    assert_eq!(a, c);
}

#[test]
fn positions_follow_lexicographic_key_order() {
    let names: Vec<&str> = PredicateKey::ORDERED.iter().map(|k| k.name()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    for (i, key) in PredicateKey::ORDERED.iter().enumerate() {
        assert_eq!(key.index(), i);
    }
    assert_eq!(PredicateKey::ORDERED.len(), N_FEATURES);
}

#[test]
fn feature_names_are_prefixed_and_sorted() {
    let names = FeatureVector::feature_names();
    assert_eq!(names.len(), N_FEATURES);
    assert!(names.iter().all(|n| n.starts_with(FEATURE_PREFIX)));
    assert_eq!(names[0], "feat__adjacentElement");
    assert_eq!(names[6], "feat__rdf_type");

    let fv = FeatureVector::from_counts([3.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
    let map = fv.to_map();
    assert_relative_eq!(map["feat__adjacentElement"], 0.6, epsilon = EPS);
    assert_relative_eq!(map["feat__hasQuality"], 0.8, epsilon = EPS);
    assert_eq!(map.keys().cloned().collect::<Vec<_>>(), names);
}

#[test]
fn fingerprint_reads_rdf_xml() {
    let fv = fingerprint(&GraphSource::Bytes(WALL_RDF_XML.into())).unwrap();
    let third = 1.0 / 3.0_f64.sqrt();
    assert_relative_eq!(fv.get(PredicateKey::RdfType), third, epsilon = EPS);
    assert_relative_eq!(fv.get(PredicateKey::AdjacentElement), third, epsilon = EPS);
    assert_relative_eq!(fv.get(PredicateKey::HasQuality), third, epsilon = EPS);
}

#[test]
fn fingerprint_propagates_parse_errors() {
    assert!(fingerprint(&GraphSource::Bytes(GARBAGE.into())).is_err());
}
