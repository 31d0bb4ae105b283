//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! End-to-end run: read every identity's table, tune, classify, write back.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::classify::{DocumentClassifier, TopicAssignment};
use crate::coherence::CoherenceScorer;
use crate::config::TuningConfig;
use crate::corpus::{Corpus, Tokenizer};
use crate::dataset::Dataset;
use crate::error::{LdaError, Result};
use crate::evaluator::LdaEvaluator;
use crate::lda::LdaModel;
use crate::phrases::PhraseModel;
use crate::plot::render_surface_from_file;
use crate::sweep::{Grid, Sweep, SweepRow};

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub best: SweepRow,
    pub documents: usize,
    pub unclassifiable: usize,
    pub final_coherence: f64,
    pub surfaces: Vec<PathBuf>,
    /// Top words of every topic of the final model.
    pub topics: Vec<Vec<(String, f64)>>,
}

pub struct TopicPipeline {
    config: TuningConfig,
}

impl TopicPipeline {
    pub fn new(config: TuningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    /// Tokenize, then merge frequent bigrams when enabled.
    pub fn prepare_texts(&self, tokenizer: &Tokenizer, raw: &[String]) -> Vec<Vec<String>> {
        let tokens: Vec<Vec<String>> = raw.iter().map(|t| tokenizer.tokenize(t)).collect();
        if !self.config.phrases.enabled {
            return tokens;
        }
        info!("--- finding bigrams ---");
        PhraseModel::learn(&tokens, &self.config.phrases).apply_all(&tokens)
    }

    pub fn run(&self, identities: &[String], force_recompute: bool) -> Result<PipelineReport> {
        if identities.is_empty() {
            return Err(LdaError::InvalidConfig("no identities to process".into()));
        }
        let config = &self.config;
        let tokenizer = Tokenizer::new(config.tokenizer)?;

        let mut datasets = Vec::with_capacity(identities.len());
        let mut combined: Vec<String> = Vec::new();
        for identity in identities {
            let dataset = Dataset::read(config.data.path_for(identity))?;
            let raw = dataset.column(&config.data.text_column)?;
            info!("Number of documents for {} is {}", identity, raw.len());
            combined.extend(raw.iter().cloned());
            datasets.push((dataset, raw));
        }

        if config.data.shuffle {
            combined.shuffle(&mut StdRng::seed_from_u64(config.engine.seed));
        }

        let texts = self.prepare_texts(&tokenizer, &combined);
        info!("--- creating BoW model ---");
        let corpus = Corpus::build(&texts);

        info!("--- returning hyperparameters ---");
        let evaluator = LdaEvaluator::new(&corpus, &texts, &config.engine, &config.coherence);
        let grid = Grid::from_config(&config.grid)?;
        let topic_range = grid.topics.clone();
        let sweep = Sweep::new(grid).parallel(config.parallel);
        let cache = ResultCache::new(&config.cache.path);
        let best = cache.load_or_compute(&evaluator, &sweep, force_recompute)?;

        info!(
            "--- Building model with coherence {:.3} (Alpha: {}, Beta: {}, Num Topics: {}) ---",
            best.coherence, best.alpha, best.beta, best.topics
        );
        let model = LdaModel::train(&corpus, &best.params(), &config.engine)?;

        info!("--- Updating {} identities' clusters ---", datasets.len());
        let classifier = DocumentClassifier::new(&model, &corpus.vocabulary, &tokenizer);
        let mut unclassifiable = 0;
        for (dataset, raw) in &mut datasets {
            let labels: Vec<i64> = classifier
                .classify_all(raw.as_slice())
                .iter()
                .map(|a| {
                    if *a == TopicAssignment::Unclassifiable {
                        unclassifiable += 1;
                    }
                    a.label()
                })
                .collect();
            dataset.set_column(&config.data.cluster_column, &labels)?;
            dataset.write()?;
        }

        let mut surfaces = Vec::new();
        for k in topic_range {
            match render_surface_from_file(cache.path(), k, &config.plot) {
                Ok(path) => surfaces.push(path),
                Err(e) => warn!(topics = k, error = %e, "coherence surface skipped"),
            }
        }

        let topics: Vec<Vec<(String, f64)>> = (0..model.num_topics())
            .map(|t| {
                model
                    .top_words(t, 10)
                    .into_iter()
                    .filter_map(|(id, p)| corpus.vocabulary.token(id).map(|w| (w.to_string(), p)))
                    .collect()
            })
            .collect();
        for (idx, words) in topics.iter().enumerate() {
            let summary: Vec<String> = words.iter().map(|(w, p)| format!("{:.3}*\"{}\"", p, w)).collect();
            info!("Topic: {} Words: {}", idx, summary.join(" + "));
        }

        let final_coherence = CoherenceScorer::new(&config.coherence).score(&model, &corpus, &texts)?;
        info!("Coherence Score: {}", final_coherence);

        Ok(PipelineReport {
            best,
            documents: combined.len(),
            unclassifiable,
            final_coherence,
            surfaces,
            topics,
        })
    }
}
