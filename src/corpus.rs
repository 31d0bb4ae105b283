//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Tokenization, vocabulary and bag-of-words vectorization.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::config::TokenizerKind;
use crate::error::Result;

pub type TokenId = u32;

pub struct Tokenizer {
    words: Option<Regex>,
}

impl Tokenizer {
    pub fn new(kind: TokenizerKind) -> Result<Self> {
        let words = match kind {
            TokenizerKind::Whitespace => None,
            TokenizerKind::UnicodeWords => Some(Regex::new("[\\p{L}\\p{M}]+")?),
        };
        Ok(Self { words })
    }

    pub fn whitespace() -> Self {
        Self { words: None }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match &self.words {
            None => text.split_whitespace().map(str::to_string).collect(),
            Some(re) => re
                .find_iter(text)
                .map(|m| m.as_str().to_lowercase())
                .collect(),
        }
    }
}

/// Sparse token counts of one document, sorted by token id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorizedDocument {
    pub entries: Vec<(TokenId, u32)>,
}

impl VectorizedDocument {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tokens, counting repeats.
    pub fn length(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c as u64).sum()
    }
}

// Vocabulary is...
//
// token <-> id
//
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    token_to_id: HashMap<String, TokenId>,
    id_to_token: Vec<String>,
}

impl Vocabulary {
    /// Ids are handed out in first-occurrence order over all documents.
    pub fn build(documents: &[Vec<String>]) -> Self {
        let mut vocab = Self::default();

        for token in documents.iter().flatten() {
            if !vocab.token_to_id.contains_key(token) {
                let id = vocab.id_to_token.len() as TokenId;
                vocab.token_to_id.insert(token.clone(), id);
                vocab.id_to_token.push(token.clone());
            }
        }

        vocab
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    pub fn id(&self, token: &str) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    /// Bag-of-words against the finished vocabulary; unknown tokens are dropped.
    pub fn vectorize<S: AsRef<str>>(&self, tokens: &[S]) -> VectorizedDocument {
        let mut counts: BTreeMap<TokenId, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(id) = self.id(token.as_ref()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        VectorizedDocument {
            entries: counts.into_iter().collect(),
        }
    }

    /// Token ids in document order, unknown tokens as `None`.
    pub fn ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Option<TokenId>> {
        tokens.iter().map(|t| self.id(t.as_ref())).collect()
    }
}

/// Vectorized documents plus the vocabulary they were built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub vocabulary: Vocabulary,
    pub documents: Vec<VectorizedDocument>,
}

impl Corpus {
    pub fn build(documents: &[Vec<String>]) -> Self {
        let vocabulary = Vocabulary::build(documents);
        let documents = documents.iter().map(|d| vocabulary.vectorize(d)).collect();
        Self {
            vocabulary,
            documents,
        }
    }

    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn num_tokens(&self) -> u64 {
        self.documents.iter().map(VectorizedDocument::length).sum()
    }
}
