//! Fingerprints a graph file and ranks every `.ttl` / `.rdf` / `.nt` file of a
//! directory against it.
//!
//! cargo run --example quick_compare -- <query-graph> <reference-dir> [top_n]
use std::env;
use std::fs;
use std::path::PathBuf;

use graphsim::dataset::GRAPH_EXTENSIONS;
use graphsim::features::FeatureVector;
use graphsim::parser::{GraphParser, GraphSource};
use graphsim::similarity::compare_to_references;

fn main() -> graphsim::Result<()> {
    let mut args = env::args().skip(1);
    let (Some(query), Some(dir)) = (args.next(), args.next()) else {
        eprintln!("usage: quick_compare <query-graph> <reference-dir> [top_n]");
        std::process::exit(2);
    };
    let top_n = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let mut references: Vec<(String, GraphSource)> = fs::read_dir(&dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| GRAPH_EXTENSIONS.contains(&e))
        })
        .map(|p: PathBuf| {
            let id = p
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            (id, GraphSource::Path(p))
        })
        .collect();
    references.sort_by(|a, b| a.0.cmp(&b.0));

    let out = compare_to_references(
        &GraphParser::default(),
        &GraphSource::Path(query.into()),
        &references,
        top_n,
    )?;

    println!("query fingerprint:");
    for (name, v) in FeatureVector::feature_names().iter().zip(out.query.values()) {
        println!("  {name:<28} {v:.3}");
    }
    println!("\ncontent cosine (not S_content), top {top_n}:");
    for m in &out.matches {
        println!("  {:<20} {:.4}", m.model, m.score);
    }
    if !out.skipped.is_empty() {
        println!("\nskipped (unparseable): {}", out.skipped.join(", "));
    }
    Ok(())
}
