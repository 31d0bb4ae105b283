//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
// LDA hyperparameter tuning for short documents.
//
// documents -> tokens (+ bigrams) -> Corpus -> Sweep over (k, alpha, beta)
//           -> best triple (cached in lda_tuning_results.csv)
//           -> final LdaModel -> per-document dominant topic (-1 if none)
//           -> coherence surface per k
//
pub mod cache;
pub mod classify;
pub mod coherence;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod lda;
pub mod params;
pub mod phrases;
pub mod pipeline;
pub mod plot;
pub mod sweep;

pub use cache::{read_table, ResultCache, DEFAULT_CACHE_FILE};
pub use classify::{DocumentClassifier, TopicAssignment};
pub use coherence::CoherenceScorer;
pub use config::{
    CacheConfig, CoherenceConfig, CoherenceMeasure, DataConfig, EngineConfig, GridConfig,
    PhrasesConfig, PlotConfig, TokenizerKind, TuningConfig,
};
pub use corpus::{Corpus, TokenId, Tokenizer, VectorizedDocument, Vocabulary};
pub use dataset::Dataset;
pub use error::{LdaError, Result};
pub use evaluator::{CoherenceEvaluator, LdaEvaluator};
pub use lda::{DocumentTopics, LatentDirichletAllocation, LdaModel};
pub use params::{HyperParams, Prior};
pub use phrases::PhraseModel;
pub use pipeline::{PipelineReport, TopicPipeline};
pub use plot::{render_surface, render_surface_from_file, surface_file_name};
pub use sweep::{Grid, Progress, Sweep, SweepOutcome, SweepRow, SweepTable};
