//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use lda_sweep::{
    CoherenceConfig, Corpus, Dataset, DocumentClassifier, EngineConfig, Grid, GridConfig,
    HyperParams, LdaEvaluator, LdaModel, Prior, ResultCache, Sweep, SweepRow, SweepTable,
    Tokenizer, TopicAssignment, TopicPipeline, TuningConfig,
};
use tempfile::TempDir;

fn docs(raw: &[&str]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|d| d.split_whitespace().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_single_point_sweep_over_real_evaluator() {
    let texts = docs(&["gun control", "gun control", "tax policy"]);
    let corpus = Corpus::build(&texts);
    let evaluator = LdaEvaluator::new(
        &corpus,
        &texts,
        &EngineConfig::default(),
        &CoherenceConfig::default(),
    );

    let grid = Grid::new(1..2, vec![Prior::Value(0.5)], vec![Prior::Value(0.5)]);
    let outcome = Sweep::new(grid).run(&evaluator).unwrap();

    assert_eq!(outcome.table.len(), 1);
    let row = outcome.table.rows()[0];
    assert_eq!(row.topics, 1);
    assert_eq!(row.alpha, Prior::Value(0.5));
    assert_eq!(row.beta, Prior::Value(0.5));
    assert!(row.coherence.is_finite());
    assert_eq!(outcome.best, row);
}

#[test]
fn test_default_grid_is_covered_exactly_once() {
    let seen = std::sync::Mutex::new(Vec::new());
    let evaluator = |p: &HyperParams| -> lda_sweep::Result<f64> {
        seen.lock().unwrap().push(p.to_string());
        Ok(p.topics as f64)
    };

    let outcome = Sweep::new(Grid::default())
        .parallel(true)
        .run(&evaluator)
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 360);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 360);
    assert_eq!(outcome.table.len(), 360);
    assert_eq!(outcome.best.topics, 10);
    // first row of the highest topic count wins the tie
    assert_eq!(outcome.best.alpha, Prior::Value(0.01));
    assert_eq!(outcome.best.beta, Prior::Value(0.01));
}

#[test]
fn test_cache_round_trip_skips_second_sweep() {
    let dir = TempDir::new().unwrap();
    let cache = ResultCache::new(dir.path().join("lda_tuning_results.csv"));
    let calls = AtomicUsize::new(0);
    let evaluator = |p: &HyperParams| -> lda_sweep::Result<f64> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(match p.alpha {
            Prior::Asymmetric => 0.75,
            _ => 0.25,
        })
    };
    let sweep = Sweep::new(Grid::new(
        2..4,
        vec![Prior::Value(0.01), Prior::Symmetric, Prior::Asymmetric],
        vec![Prior::Value(0.61), Prior::Symmetric],
    ));

    let first = cache.load_or_compute(&evaluator, &sweep, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 12);
    assert_eq!(first.topics, 2);
    assert_eq!(first.alpha, Prior::Asymmetric);
    assert_eq!(first.beta, Prior::Value(0.61));

    let second = cache.load_or_compute(&evaluator, &sweep, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 12);
    assert_eq!(second, first);

    let table = cache.load().unwrap();
    assert_eq!(table.len(), 12);
    assert!(table.matches_grid(sweep.grid()));
}

#[test]
fn test_unknown_words_get_the_sentinel() {
    let texts = docs(&[
        "gun control rifle",
        "tax policy budget",
        "gun control rifle",
        "tax policy budget",
    ]);
    let corpus = Corpus::build(&texts);
    let model = LdaModel::train(
        &corpus,
        &HyperParams::new(2, Prior::Symmetric, Prior::Symmetric),
        &EngineConfig::default(),
    )
    .unwrap();
    let tokenizer = Tokenizer::whitespace();
    let classifier = DocumentClassifier::new(&model, &corpus.vocabulary, &tokenizer);

    let labels: Vec<i64> = classifier
        .classify_all(&["gun control", "", "weather forecast"][..])
        .iter()
        .map(TopicAssignment::label)
        .collect();
    assert!((0..2).contains(&labels[0]));
    assert_eq!(&labels[1..], &[-1, -1]);
}

fn write_identity(dir: &Path, identity: &str, rows: &[(&str, &str)]) {
    let mut text = String::from("id,clean_text\n");
    for (id, body) in rows {
        text.push_str(&format!("{},{}\n", id, body));
    }
    std::fs::write(dir.join(format!("{}_data.csv", identity)), text).unwrap();
}

fn small_config(dir: &Path) -> TuningConfig {
    let mut config = TuningConfig::default();
    config.grid = GridConfig {
        min_topics: 1,
        max_topics: 3,
        prior_start: 0.5,
        prior_stop: 0.6,
        prior_step: 0.5,
        alpha_tags: vec![],
        beta_tags: vec![Prior::Symmetric],
    };
    config.engine.passes = 5;
    config.data.path_template = dir.join("{}_data.csv").to_string_lossy().into_owned();
    config.cache.path = dir.join("lda_tuning_results.csv");
    config.plot.output_dir = dir.join("plots");
    config.parallel = true;
    config
}

#[test]
fn test_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_identity(
        dir.path(),
        "alice",
        &[
            ("1", "gun control rifle"),
            ("2", "gun control"),
            ("3", ""),
            ("4", "rifle gun"),
        ],
    );
    write_identity(
        dir.path(),
        "bob",
        &[
            ("1", "tax policy budget"),
            ("2", "budget tax"),
            ("3", "policy budget"),
        ],
    );

    let identities = vec!["alice".to_string(), "bob".to_string()];
    let pipeline = TopicPipeline::new(small_config(dir.path())).unwrap();
    let report = pipeline.run(&identities, false).unwrap();

    assert_eq!(report.documents, 7);
    assert_eq!(report.unclassifiable, 1);
    assert!((1..3).contains(&report.best.topics));
    assert_eq!(report.topics.len(), report.best.topics);
    assert!(report.final_coherence.is_finite());

    let cached = std::fs::read_to_string(dir.path().join("lda_tuning_results.csv")).unwrap();
    assert_eq!(cached.lines().next(), Some("Topics,Alpha,Beta,Coherence"));
    assert_eq!(cached.lines().count(), 5);

    assert_eq!(report.surfaces.len(), 2);
    assert!(dir.path().join("plots/Coherence_Surface_k=2.png").is_file());
    for surface in &report.surfaces {
        let bytes = std::fs::read(surface).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    let alice = Dataset::read(dir.path().join("alice_data.csv")).unwrap();
    let clusters = alice.column("lda_cluster").unwrap();
    assert_eq!(clusters.len(), 4);
    assert_eq!(clusters[2], "-1");
    let k = report.best.topics as i64;
    for label in [&clusters[0], &clusters[1], &clusters[3]] {
        let label: i64 = label.parse().unwrap();
        assert!((0..k).contains(&label));
    }
    let bob = Dataset::read(dir.path().join("bob_data.csv")).unwrap();
    assert_eq!(bob.column("lda_cluster").unwrap().len(), 3);
}

#[test]
fn test_pipeline_reuses_cached_best() {
    let dir = TempDir::new().unwrap();
    write_identity(
        dir.path(),
        "carol",
        &[
            ("1", "gun control rifle"),
            ("2", "tax policy budget"),
            ("3", "gun rifle"),
            ("4", "budget policy"),
        ],
    );

    let mut table = SweepTable::default();
    table.push(SweepRow::new(HyperParams::new(2, 0.5, 0.5), 0.1));
    table.push(SweepRow::new(
        HyperParams::new(2, Prior::Symmetric, Prior::Symmetric),
        9.0,
    ));
    let config = small_config(dir.path());
    ResultCache::new(&config.cache.path).store(&table).unwrap();

    let report = TopicPipeline::new(config)
        .unwrap()
        .run(&["carol".to_string()], false)
        .unwrap();

    assert_eq!(report.best.topics, 2);
    assert_eq!(report.best.alpha, Prior::Symmetric);
    assert_eq!(report.best.beta, Prior::Symmetric);
    assert_eq!(report.best.coherence, 9.0);
    assert_eq!(report.topics.len(), 2);
    // no k=1 rows in the cached table
    assert_eq!(report.surfaces.len(), 1);
    assert!(report.surfaces[0].ends_with("Coherence_Surface_k=2.png"));
}

#[test]
fn test_pipeline_rejects_missing_identities() {
    let dir = TempDir::new().unwrap();
    let pipeline = TopicPipeline::new(small_config(dir.path())).unwrap();
    assert!(pipeline.run(&[], false).is_err());
    assert!(pipeline.run(&["nobody".to_string()], false).is_err());
}
