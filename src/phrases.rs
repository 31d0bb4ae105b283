//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Collocation detection: frequent adjacent pairs become single tokens,
//! e.g. `gun control` -> `gun_control`.

use std::collections::HashMap;

use tracing::debug;

use crate::config::PhrasesConfig;

pub struct PhraseModel {
    unigrams: HashMap<String, u64>,
    bigrams: HashMap<(String, String), u64>,
    min_count: u64,
    threshold: f64,
    delimiter: String,
}

impl PhraseModel {
    pub fn learn(documents: &[Vec<String>], config: &PhrasesConfig) -> Self {
        let mut unigrams: HashMap<String, u64> = HashMap::new();
        let mut bigrams: HashMap<(String, String), u64> = HashMap::new();

        for doc in documents {
            for token in doc {
                *unigrams.entry(token.clone()).or_insert(0) += 1;
            }
            for pair in doc.windows(2) {
                *bigrams
                    .entry((pair[0].clone(), pair[1].clone()))
                    .or_insert(0) += 1;
            }
        }

        debug!(
            unigrams = unigrams.len(),
            bigrams = bigrams.len(),
            "phrase counts collected"
        );

        Self {
            unigrams,
            bigrams,
            min_count: config.min_count,
            threshold: config.threshold,
            delimiter: config.delimiter.clone(),
        }
    }

    /// `(count(a b) - min_count) / (count(a) * count(b)) * vocabulary size`
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let pair = self.bigrams.get(&(a.to_string(), b.to_string()))?;
        let count_a = *self.unigrams.get(a)? as f64;
        let count_b = *self.unigrams.get(b)? as f64;
        let vocab_len = (self.unigrams.len() + self.bigrams.len()) as f64;
        Some((*pair as f64 - self.min_count as f64) / (count_a * count_b) * vocab_len)
    }

    /// Greedy left-to-right merge; a merged token never joins a second pair.
    pub fn apply(&self, doc: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(doc.len());
        let mut i = 0;
        while i < doc.len() {
            if i + 1 < doc.len() {
                if let Some(score) = self.score(&doc[i], &doc[i + 1]) {
                    if score > self.threshold {
                        out.push(format!("{}{}{}", doc[i], self.delimiter, doc[i + 1]));
                        i += 2;
                        continue;
                    }
                }
            }
            out.push(doc[i].clone());
            i += 1;
        }
        out
    }

    pub fn apply_all(&self, documents: &[Vec<String>]) -> Vec<Vec<String>> {
        documents.iter().map(|d| self.apply(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn loose() -> PhrasesConfig {
        PhrasesConfig {
            min_count: 1,
            threshold: 1.0,
            ..PhrasesConfig::default()
        }
    }

    #[test]
    fn test_frequent_pair_is_merged() {
        let mut docs = vec![tokens("gun control now"); 4];
        docs.push(tokens("tax policy"));
        let model = PhraseModel::learn(&docs, &loose());
        assert_eq!(
            model.apply(&tokens("we want gun control")),
            tokens("we want gun_control")
        );
    }

    #[test]
    fn test_rare_pair_is_kept() {
        let docs = vec![tokens("gun control"), tokens("tax policy")];
        let model = PhraseModel::learn(&docs, &PhrasesConfig::default());
        assert_eq!(model.apply(&tokens("gun control")), tokens("gun control"));
    }

    #[test]
    fn test_merge_is_greedy() {
        let docs = vec![tokens("a b a b a b"); 3];
        let config = PhrasesConfig {
            threshold: 0.1,
            ..loose()
        };
        let model = PhraseModel::learn(&docs, &config);
        let merged = model.apply(&tokens("a b a"));
        assert_eq!(merged[0], "a_b");
        assert_eq!(merged.len(), 2);
    }
}
