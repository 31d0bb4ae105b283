//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Topic coherence.
//!
//! c_v follows M. Röder, A. Both, A. Hinneburg, "Exploring the Space of Topic
//! Coherence Measures", WSDM 2015: boolean sliding windows, NPMI, one-set
//! segmentation and indirect cosine confirmation. u_mass uses document
//! co-occurrence over the vectorized corpus.

use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;

use crate::config::{CoherenceConfig, CoherenceMeasure};
use crate::corpus::{Corpus, TokenId};
use crate::error::{LdaError, Result};
use crate::lda::LdaModel;

const EPSILON: f64 = 1e-12;

/// Boolean occurrence counts of the topic words over a set of windows.
struct Occurrences {
    slot: HashMap<TokenId, usize>,
    single: Vec<u64>,
    pairs: HashMap<(usize, usize), u64>,
    windows: u64,
}

impl Occurrences {
    fn new(topics: &[Vec<TokenId>]) -> Self {
        let mut slot = HashMap::new();
        for id in topics.iter().flatten() {
            let next = slot.len();
            slot.entry(*id).or_insert(next);
        }
        let single = vec![0; slot.len()];
        Self {
            slot,
            single,
            pairs: HashMap::new(),
            windows: 0,
        }
    }

    fn add_window<'a>(&mut self, present: impl Iterator<Item = &'a usize> + Clone) {
        self.windows += 1;
        let mut rest = present.clone();
        for &a in present {
            self.single[a] += 1;
            rest.next();
            for &b in rest.clone() {
                *self.pairs.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    /// Sliding windows of `size` tokens. Texts shorter than the window count
    /// once as a whole; tokens outside the topic words keep their position.
    fn sliding(topics: &[Vec<TokenId>], corpus: &Corpus, texts: &[Vec<String>], size: usize) -> Self {
        let mut occ = Self::new(topics);
        let mut in_window = vec![0u32; occ.slot.len()];

        for text in texts {
            if text.is_empty() {
                continue;
            }
            let slots: Vec<Option<usize>> = corpus
                .vocabulary
                .ids(text)
                .into_iter()
                .map(|id| id.and_then(|id| occ.slot.get(&id).copied()))
                .collect();

            let mut present: BTreeSet<usize> = BTreeSet::new();
            let first = size.min(slots.len());
            for s in slots[..first].iter().flatten() {
                in_window[*s] += 1;
                present.insert(*s);
            }
            occ.add_window(present.iter());

            for end in first..slots.len() {
                if let Some(s) = slots[end - first] {
                    in_window[s] -= 1;
                    if in_window[s] == 0 {
                        present.remove(&s);
                    }
                }
                if let Some(s) = slots[end] {
                    in_window[s] += 1;
                    present.insert(s);
                }
                occ.add_window(present.iter());
            }

            for s in present {
                in_window[s] = 0;
            }
        }

        occ
    }

    /// One window per vectorized document.
    fn documents(topics: &[Vec<TokenId>], corpus: &Corpus) -> Self {
        let mut occ = Self::new(topics);
        for doc in &corpus.documents {
            let present: BTreeSet<usize> = doc
                .entries
                .iter()
                .filter_map(|(id, _)| occ.slot.get(id).copied())
                .collect();
            occ.add_window(present.iter());
        }
        occ
    }

    fn count(&self, a: usize, b: usize) -> u64 {
        if a == b {
            return self.single[a];
        }
        let key = if a < b { (a, b) } else { (b, a) };
        self.pairs.get(&key).copied().unwrap_or(0)
    }

    fn npmi(&self, a: usize, b: usize) -> f64 {
        let n = self.windows as f64;
        let pa = self.single[a] as f64 / n;
        let pb = self.single[b] as f64 / n;
        if pa == 0.0 || pb == 0.0 {
            return 0.0;
        }
        let co = self.count(a, b) as f64 / n + EPSILON;
        (co / (pa * pb)).ln() / -co.ln()
    }

    fn log_conditional(&self, prime: usize, star: usize) -> Option<f64> {
        if self.single[star] == 0 {
            return None;
        }
        let n = self.windows as f64;
        let co = self.count(prime, star) as f64 / n;
        Some(((co + EPSILON) / (self.single[star] as f64 / n)).ln())
    }
}

fn cosine(a: ndarray::ArrayView1<f64>, b: ndarray::ArrayView1<f64>) -> f64 {
    let norm = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if norm == 0.0 {
        0.0
    } else {
        a.dot(&b) / norm
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub struct CoherenceScorer {
    pub measure: CoherenceMeasure,
    pub top_n: usize,
    pub window_size: usize,
}

impl CoherenceScorer {
    pub fn new(config: &CoherenceConfig) -> Self {
        Self {
            measure: config.measure,
            top_n: config.top_n,
            window_size: config.window_size,
        }
    }

    /// Mean coherence over the model's topics; higher is better.
    pub fn score(&self, model: &LdaModel, corpus: &Corpus, texts: &[Vec<String>]) -> Result<f64> {
        let per_topic = self.per_topic(&model.topics(self.top_n), corpus, texts)?;
        Ok(mean(&per_topic))
    }

    pub fn per_topic(
        &self,
        topics: &[Vec<TokenId>],
        corpus: &Corpus,
        texts: &[Vec<String>],
    ) -> Result<Vec<f64>> {
        if topics.is_empty() {
            return Err(LdaError::EmptyCorpus("no topics to score".into()));
        }
        let occ = match self.measure {
            CoherenceMeasure::Cv => Occurrences::sliding(topics, corpus, texts, self.window_size),
            CoherenceMeasure::UMass => Occurrences::documents(topics, corpus),
        };
        if occ.windows == 0 {
            return Err(LdaError::EmptyCorpus(
                "no windows to count co-occurrences over".into(),
            ));
        }

        Ok(topics
            .iter()
            .map(|topic| {
                let slots: Vec<usize> = topic.iter().map(|id| occ.slot[id]).collect();
                match self.measure {
                    CoherenceMeasure::Cv => cv_topic(&occ, &slots),
                    CoherenceMeasure::UMass => umass_topic(&occ, &slots),
                }
            })
            .collect())
    }
}

fn cv_topic(occ: &Occurrences, slots: &[usize]) -> f64 {
    if slots.is_empty() {
        return 0.0;
    }
    let m = slots.len();
    let context = Array2::from_shape_fn((m, m), |(i, j)| occ.npmi(slots[i], slots[j]));
    let topic_vector = context.sum_axis(ndarray::Axis(0));
    let confirmations: Vec<f64> = context
        .rows()
        .into_iter()
        .map(|row| cosine(row, topic_vector.view()))
        .collect();
    mean(&confirmations)
}

fn umass_topic(occ: &Occurrences, slots: &[usize]) -> f64 {
    let mut scores = Vec::new();
    for (i, &prime) in slots.iter().enumerate().skip(1) {
        for &star in &slots[..i] {
            if let Some(s) = occ.log_conditional(prime, star) {
                scores.push(s);
            }
        }
    }
    if scores.is_empty() {
        0.0
    } else {
        mean(&scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn scorer(measure: CoherenceMeasure) -> CoherenceScorer {
        CoherenceScorer::new(&CoherenceConfig {
            measure,
            ..CoherenceConfig::default()
        })
    }

    fn ids(corpus: &Corpus, words: &[&str]) -> Vec<TokenId> {
        words.iter().map(|w| corpus.vocabulary.id(w).unwrap()).collect()
    }

    #[test]
    fn test_cv_words_always_together() {
        let docs = texts(&["gun control", "gun control", "tax policy"]);
        let corpus = Corpus::build(&docs);
        let topics = vec![ids(&corpus, &["gun", "control"])];
        let scores = scorer(CoherenceMeasure::Cv)
            .per_topic(&topics, &corpus, &docs)
            .unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cv_prefers_cooccurring_topics() {
        let docs = texts(&[
            "gun control rifle",
            "gun control rifle",
            "tax policy budget",
            "tax policy budget",
        ]);
        let corpus = Corpus::build(&docs);
        let s = scorer(CoherenceMeasure::Cv);
        let coherent = vec![
            ids(&corpus, &["gun", "control", "rifle"]),
            ids(&corpus, &["tax", "policy", "budget"]),
        ];
        let mixed = vec![
            ids(&corpus, &["gun", "policy", "rifle"]),
            ids(&corpus, &["tax", "control", "budget"]),
        ];
        let good = mean(&s.per_topic(&coherent, &corpus, &docs).unwrap());
        let bad = mean(&s.per_topic(&mixed, &corpus, &docs).unwrap());
        assert!(good > bad);
    }

    #[test]
    fn test_sliding_window_counts() {
        let docs = texts(&["a b c d"]);
        let corpus = Corpus::build(&docs);
        let topics = vec![ids(&corpus, &["a", "d"])];
        let occ = Occurrences::sliding(&topics, &corpus, &docs, 2);
        assert_eq!(occ.windows, 3);
        assert_eq!(occ.count(0, 0), 1);
        assert_eq!(occ.count(0, 1), 0);

        let occ = Occurrences::sliding(&topics, &corpus, &docs, 110);
        assert_eq!(occ.windows, 1);
        assert_eq!(occ.count(0, 1), 1);
    }

    #[test]
    fn test_umass_is_non_positive_for_subsets() {
        let docs = texts(&["gun control", "gun", "tax policy"]);
        let corpus = Corpus::build(&docs);
        let topics = vec![ids(&corpus, &["gun", "control"])];
        let scores = scorer(CoherenceMeasure::UMass)
            .per_topic(&topics, &corpus, &docs)
            .unwrap();
        // log(P(control, gun) / P(gun)) = log(1/2)
        assert!((scores[0] - 0.5f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_no_texts_is_an_error() {
        let docs = texts(&["gun control"]);
        let corpus = Corpus::build(&docs);
        let topics = vec![ids(&corpus, &["gun"])];
        let result = scorer(CoherenceMeasure::Cv).per_topic(&topics, &corpus, &[]);
        assert!(matches!(result, Err(LdaError::EmptyCorpus(_))));
    }
}
