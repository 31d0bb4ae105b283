//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Scoring of a single grid point.

use tracing::debug;

use crate::coherence::CoherenceScorer;
use crate::config::{CoherenceConfig, EngineConfig};
use crate::corpus::Corpus;
use crate::error::Result;
use crate::lda::LdaModel;
use crate::params::HyperParams;

/// Turns one hyperparameter triple into a coherence score.
///
/// Implementations must not share mutable state between calls; the sweep may
/// evaluate grid points concurrently.
pub trait CoherenceEvaluator: Sync {
    fn evaluate(&self, params: &HyperParams) -> Result<f64>;
}

/// Plain functions and closures score grid points directly.
impl<F> CoherenceEvaluator for F
where
    F: Fn(&HyperParams) -> Result<f64> + Sync,
{
    fn evaluate(&self, params: &HyperParams) -> Result<f64> {
        self(params)
    }
}

/// Trains a fresh model per triple with fixed auxiliary settings and scores it.
pub struct LdaEvaluator<'a> {
    corpus: &'a Corpus,
    texts: &'a [Vec<String>],
    engine: EngineConfig,
    scorer: CoherenceScorer,
}

impl<'a> LdaEvaluator<'a> {
    pub fn new(
        corpus: &'a Corpus,
        texts: &'a [Vec<String>],
        engine: &EngineConfig,
        coherence: &CoherenceConfig,
    ) -> Self {
        Self {
            corpus,
            texts,
            engine: engine.clone(),
            scorer: CoherenceScorer::new(coherence),
        }
    }
}

impl CoherenceEvaluator for LdaEvaluator<'_> {
    fn evaluate(&self, params: &HyperParams) -> Result<f64> {
        let model = LdaModel::train(self.corpus, params, &self.engine)?;
        let coherence = self.scorer.score(&model, self.corpus, self.texts)?;
        debug!(%params, coherence, "grid point scored");
        Ok(coherence)
    }
}
