//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Error types for the sweep, the topic engine and the file layers.

use thiserror::Error;

use crate::corpus::TokenId;

/// Errors produced by training, scoring, caching and plotting.
#[derive(Debug, Error)]
pub enum LdaError {
    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML configuration parse error.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Tokenizer pattern failed to compile.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration values that cannot drive a sweep.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A topic count or prior the engine cannot train with.
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperParameter(String),

    /// Training or scoring over a collection without tokens.
    #[error("empty corpus: {0}")]
    EmptyCorpus(String),

    /// Inference over a document that vectorized to nothing.
    #[error("document has no tokens in the vocabulary")]
    EmptyDocument,

    /// Token id outside the vocabulary the model was trained on.
    #[error("token id {id} outside vocabulary of size {size}")]
    UnknownToken { id: TokenId, size: usize },

    /// A cache cell that is neither a float nor a known tag.
    #[error("cannot parse prior {0:?}")]
    InvalidPrior(String),

    /// Input table lacks the expected column.
    #[error("column {column:?} not found in {path}")]
    MissingColumn { column: String, path: String },

    /// No sweep rows to select from or to plot.
    #[error("no sweep results: {0}")]
    NoResults(String),

    /// Weights that cannot be ordered (NaN).
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Rendering backend failure.
    #[error("plot error: {0}")]
    Plot(String),
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, LdaError>;
