//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Dominant-topic labelling of raw documents.

use std::fmt;

use tracing::debug;

use crate::corpus::{Tokenizer, Vocabulary};
use crate::error::{LdaError, Result};
use crate::lda::LdaModel;

/// Outcome of classifying one document. `Unclassifiable` marks rows to discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicAssignment {
    Topic(usize),
    Unclassifiable,
}

impl TopicAssignment {
    pub const SENTINEL: i64 = -1;

    /// Value written to the `lda_cluster` column.
    pub fn label(&self) -> i64 {
        match self {
            TopicAssignment::Topic(t) => *t as i64,
            TopicAssignment::Unclassifiable => Self::SENTINEL,
        }
    }

    pub fn topic(&self) -> Option<usize> {
        match self {
            TopicAssignment::Topic(t) => Some(*t),
            TopicAssignment::Unclassifiable => None,
        }
    }
}

impl fmt::Display for TopicAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub struct DocumentClassifier<'a> {
    model: &'a LdaModel,
    vocabulary: &'a Vocabulary,
    tokenizer: &'a Tokenizer,
}

impl<'a> DocumentClassifier<'a> {
    pub fn new(model: &'a LdaModel, vocabulary: &'a Vocabulary, tokenizer: &'a Tokenizer) -> Self {
        Self {
            model,
            vocabulary,
            tokenizer,
        }
    }

    /// Never fails: anything that goes wrong yields `Unclassifiable`.
    pub fn classify(&self, text: &str) -> TopicAssignment {
        match self.dominant_topic(text) {
            Ok(topic) => TopicAssignment::Topic(topic),
            Err(e) => {
                debug!(error = %e, "document left unclassified");
                TopicAssignment::Unclassifiable
            }
        }
    }

    pub fn classify_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<TopicAssignment> {
        texts.iter().map(|t| self.classify(t.as_ref())).collect()
    }

    /// Highest weight after a stable descending sort, so ties keep the lower
    /// topic index.
    pub fn dominant_topic(&self, text: &str) -> Result<usize> {
        let tokens = self.tokenizer.tokenize(text);
        let bow = self.vocabulary.vectorize(&tokens);
        let mut topics = self.model.document_topics(&bow)?.topics;
        topics.sort_by(|a, b| b.1.total_cmp(&a.1));
        topics
            .first()
            .map(|(t, _)| *t)
            .ok_or(LdaError::EmptyDocument)
    }
}
