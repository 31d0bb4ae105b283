//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
// This file implements LDA w/Collapsed Gibbs Samping by:
//
//     D. Newman, A. Asuncion, P. Smyth, M. Welling. "Distributed Algorithms for Topic Models." JMLR 2009.
//
// https://www.ics.uci.edu/~asuncion/software/fast.htm
//
// Documents are visited in batches; the topic totals in the sampling
// denominator are a snapshot refreshed at every batch boundary, the
// sequential analogue of the per-processor stale counts in AD-LDA.
//
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_stats::QuantileExt;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::EngineConfig;
use crate::corpus::{Corpus, TokenId, VectorizedDocument};
use crate::error::{LdaError, Result};
use crate::params::{HyperParams, Prior};

/// Per-topic document prior. `symmetric` is `1/K`; `asymmetric` is
/// `1/(i + sqrt(K))` normalized to sum to one.
pub fn resolve_alpha(prior: &Prior, t: usize) -> Result<Array1<f64>> {
    match prior {
        Prior::Value(a) => Ok(Array1::from_elem(t, positive("alpha", *a)?)),
        Prior::Symmetric => Ok(Array1::from_elem(t, 1.0 / t as f64)),
        Prior::Asymmetric => {
            let root = (t as f64).sqrt();
            let raw: Array1<f64> = (0..t).map(|i| 1.0 / (i as f64 + root)).collect();
            let total = raw.sum();
            Ok(raw / total)
        }
    }
}

/// Topic-word prior. There is no asymmetric policy over words.
pub fn resolve_beta(prior: &Prior, t: usize) -> Result<f64> {
    match prior {
        Prior::Value(b) => positive("beta", *b),
        Prior::Symmetric => Ok(1.0 / t as f64),
        Prior::Asymmetric => Err(LdaError::InvalidHyperParameter(
            "beta cannot be asymmetric".into(),
        )),
    }
}

fn positive(name: &str, v: f64) -> Result<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(LdaError::InvalidHyperParameter(format!(
            "{} must be a positive density, got {}",
            name, v
        )))
    }
}

// LatentDirichletAllocation is...
//
// the sampler configuration for one (k, alpha, beta) triple
//
pub struct LatentDirichletAllocation {
    pub t: usize,
    pub passes: usize,
    pub batch_size: usize,
    pub alpha: Array1<f64>,
    pub beta: f64,
    pub seed: u64,
    pub per_word_topics: bool,
    pub inference_iterations: usize,
}

/// Count state of the sampler, flattened over token positions.
struct SamplerState {
    words: Vec<usize>,
    doc_start: Vec<usize>,
    z: Array1<usize>,
    dp: Array2<f64>,
    wp: Array2<f64>,
    ztot: Array1<f64>,
}

impl LatentDirichletAllocation {
    pub fn new(params: &HyperParams, engine: &EngineConfig) -> Result<Self> {
        if params.topics == 0 {
            return Err(LdaError::InvalidHyperParameter(
                "topic count must be positive".into(),
            ));
        }
        Ok(Self {
            t: params.topics,
            passes: engine.passes.max(1),
            batch_size: engine.batch_size.max(1),
            alpha: resolve_alpha(&params.alpha, params.topics)?,
            beta: resolve_beta(&params.beta, params.topics)?,
            seed: engine.seed,
            per_word_topics: engine.per_word_topics,
            inference_iterations: engine.inference_iterations.max(1),
        })
    }

    fn initialize(&self, corpus: &Corpus, rng: &mut StdRng) -> SamplerState {
        let d = corpus.num_documents();
        let w = corpus.vocabulary.len();

        let mut words: Vec<usize> = Vec::with_capacity(corpus.num_tokens() as usize);
        let mut doc_start: Vec<usize> = Vec::with_capacity(d + 1);
        for doc in &corpus.documents {
            doc_start.push(words.len());
            for &(id, count) in &doc.entries {
                words.extend(std::iter::repeat(id as usize).take(count as usize));
            }
        }
        doc_start.push(words.len());

        let z: Array1<usize> = Array1::random_using(words.len(), Uniform::new(0, self.t), rng);
        let mut dp: Array2<f64> = Array2::zeros((d, self.t));
        let mut wp: Array2<f64> = Array2::zeros((self.t, w));

        for di in 0..d {
            for n in doc_start[di]..doc_start[di + 1] {
                dp[[di, z[n]]] += 1.0;
                wp[[z[n], words[n]]] += 1.0;
            }
        }
        let ztot = wp.sum_axis(Axis(1));

        SamplerState {
            words,
            doc_start,
            z,
            dp,
            wp,
            ztot,
        }
    }

    // one full pass over the corpus
    //
    fn gibbs(&self, state: &mut SamplerState, rng: &mut StdRng, weights: &mut [f64]) {
        let d = state.dp.nrows();
        let wbeta = state.wp.ncols() as f64 * self.beta;

        let mut batch_start = 0;
        while batch_start < d {
            let batch_end = (batch_start + self.batch_size).min(d);
            let ztot0 = state.ztot.clone();

            for di in batch_start..batch_end {
                for n in state.doc_start[di]..state.doc_start[di + 1] {
                    let wi = state.words[n];
                    let old = state.z[n];

                    state.dp[[di, old]] -= 1.0;
                    state.wp[[old, wi]] -= 1.0;
                    state.ztot[old] -= 1.0;

                    let mut total = 0.0;
                    for t in 0..self.t {
                        let p = (state.dp[[di, t]] + self.alpha[t]) * (state.wp[[t, wi]] + self.beta)
                            / (ztot0[t] + wbeta);
                        weights[t] = p;
                        total += p;
                    }

                    let mut u = rng.gen::<f64>() * total;
                    let mut new = self.t - 1;
                    for (t, p) in weights.iter().enumerate() {
                        u -= p;
                        if u <= 0.0 {
                            new = t;
                            break;
                        }
                    }

                    state.z[n] = new;
                    state.dp[[di, new]] += 1.0;
                    state.wp[[new, wi]] += 1.0;
                    state.ztot[new] += 1.0;
                }
            }

            batch_start = batch_end;
        }
    }

    pub fn train(&self, corpus: &Corpus) -> Result<LdaModel> {
        if corpus.vocabulary.is_empty() || corpus.num_tokens() == 0 {
            return Err(LdaError::EmptyCorpus(format!(
                "cannot train over {} documents without terms",
                corpus.num_documents()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut state = self.initialize(corpus, &mut rng);
        let mut weights = vec![0.0f64; self.t];

        for pass in 0..self.passes {
            self.gibbs(&mut state, &mut rng, &mut weights);
            debug!(pass = pass + 1, passes = self.passes, k = self.t, "gibbs pass");
        }

        let mut topic_word = state.wp.mapv(|c| c + self.beta);
        for mut row in topic_word.rows_mut() {
            let total = row.sum();
            row /= total;
        }

        Ok(LdaModel {
            alpha: self.alpha.clone(),
            topic_word,
            per_word_topics: self.per_word_topics,
            inference_iterations: self.inference_iterations,
        })
    }
}

/// Topic mixture of one document, every topic listed in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTopics {
    pub topics: Vec<(usize, f64)>,
    /// Most likely topic of each word; empty unless per-word topics are on.
    pub word_topics: Vec<(TokenId, usize)>,
}

/// Trained topic-word distributions plus the document prior used for inference.
#[derive(Debug, Clone)]
pub struct LdaModel {
    alpha: Array1<f64>,
    topic_word: Array2<f64>,
    per_word_topics: bool,
    inference_iterations: usize,
}

impl LdaModel {
    pub fn train(corpus: &Corpus, params: &HyperParams, engine: &EngineConfig) -> Result<Self> {
        LatentDirichletAllocation::new(params, engine)?.train(corpus)
    }

    pub fn num_topics(&self) -> usize {
        self.topic_word.nrows()
    }

    pub fn vocab_size(&self) -> usize {
        self.topic_word.ncols()
    }

    /// `(K, W)`, each row sums to one.
    pub fn topic_word(&self) -> &Array2<f64> {
        &self.topic_word
    }

    pub fn top_words(&self, topic: usize, n: usize) -> Vec<(TokenId, f64)> {
        let mut pairs: Vec<(TokenId, f64)> = self
            .topic_word
            .row(topic)
            .iter()
            .enumerate()
            .map(|(w, p)| (w as TokenId, *p))
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs.truncate(n);
        pairs
    }

    /// Top `n` word ids of every topic.
    pub fn topics(&self, n: usize) -> Vec<Vec<TokenId>> {
        (0..self.num_topics())
            .map(|t| self.top_words(t, n).into_iter().map(|(w, _)| w).collect())
            .collect()
    }

    pub fn document_topics(&self, doc: &VectorizedDocument) -> Result<DocumentTopics> {
        if doc.is_empty() {
            return Err(LdaError::EmptyDocument);
        }
        let size = self.vocab_size();
        if let Some(&(id, _)) = doc.entries.iter().find(|(id, _)| *id as usize >= size) {
            return Err(LdaError::UnknownToken { id, size });
        }

        let k = self.num_topics();
        let length = doc.length() as f64;
        let alpha_sum = self.alpha.sum();
        let mut theta: Array1<f64> = Array1::from_elem(k, 1.0 / k as f64);
        let mut expected: Array1<f64> = Array1::zeros(k);

        for _ in 0..self.inference_iterations {
            expected.fill(0.0);
            for &(id, count) in &doc.entries {
                let resp = &theta * &self.topic_word.column(id as usize);
                let norm = resp.sum();
                if norm > 0.0 {
                    expected.scaled_add(count as f64 / norm, &resp);
                }
            }
            theta = (&expected + &self.alpha) / (length + alpha_sum);
        }

        let mut word_topics = Vec::new();
        if self.per_word_topics {
            word_topics.reserve(doc.entries.len());
            for &(id, _) in &doc.entries {
                let resp = &theta * &self.topic_word.column(id as usize);
                let best = resp
                    .argmax()
                    .map_err(|e| LdaError::Numeric(format!("word {}: {}", id, e)))?;
                word_topics.push((id, best));
            }
        }

        Ok(DocumentTopics {
            topics: theta.iter().copied().enumerate().collect(),
            word_topics,
        })
    }
}
