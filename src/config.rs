//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Sweep, engine and pipeline configuration.
//!
//! Every field has a default so an empty TOML document yields the reference
//! setup: topics 6..11, seed 100, batches of 100 documents, 10 passes, c_v
//! coherence and the `lda_tuning_results.csv` cache in the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LdaError, Result};
use crate::params::Prior;

/// Master configuration for a tuning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub coherence: CoherenceConfig,
    pub phrases: PhrasesConfig,
    pub tokenizer: TokenizerKind,
    pub data: DataConfig,
    pub plot: PlotConfig,
    pub cache: CacheConfig,
    /// Evaluate grid points on the rayon pool instead of one after another.
    pub parallel: bool,
}

impl TuningConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TuningConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.engine.validate()?;
        self.coherence.validate()?;
        if self.phrases.min_count == 0 {
            return Err(LdaError::InvalidConfig(
                "phrases.min_count must be at least 1".into(),
            ));
        }
        if !self.data.path_template.contains("{}") {
            return Err(LdaError::InvalidConfig(format!(
                "data.path_template {:?} has no {{}} placeholder",
                self.data.path_template
            )));
        }
        Ok(())
    }
}

/// Grid specification. Numeric candidates are `start + i * step` below
/// `stop`, followed by the tags.
///
/// The default step of 0.15 gives seven numeric values (360 points in all).
/// Setting `prior_step = 0.3` reproduces the coarser four-value grid
/// `0.01, 0.31, 0.61, 0.91` of the original notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_min_topics")]
    pub min_topics: usize,

    /// Exclusive upper bound.
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    #[serde(default = "default_prior_start")]
    pub prior_start: f64,

    #[serde(default = "default_prior_stop")]
    pub prior_stop: f64,

    #[serde(default = "default_prior_step")]
    pub prior_step: f64,

    #[serde(default = "default_alpha_tags")]
    pub alpha_tags: Vec<Prior>,

    /// `asymmetric` is left out on purpose: the engine cannot resolve it for
    /// the topic-word prior.
    #[serde(default = "default_beta_tags")]
    pub beta_tags: Vec<Prior>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_topics: default_min_topics(),
            max_topics: default_max_topics(),
            prior_start: default_prior_start(),
            prior_stop: default_prior_stop(),
            prior_step: default_prior_step(),
            alpha_tags: default_alpha_tags(),
            beta_tags: default_beta_tags(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_topics == 0 || self.min_topics >= self.max_topics {
            return Err(LdaError::InvalidConfig(format!(
                "topic range {}..{} is empty or starts at zero",
                self.min_topics, self.max_topics
            )));
        }
        if !(self.prior_step > 0.0)
            || !self.prior_step.is_finite()
            || !self.prior_start.is_finite()
            || !self.prior_stop.is_finite()
        {
            return Err(LdaError::InvalidConfig(format!(
                "prior range {}..{} step {} is not usable",
                self.prior_start, self.prior_stop, self.prior_step
            )));
        }
        Ok(())
    }

    /// Evenly spaced numeric candidates shared by alpha and beta.
    pub fn prior_values(&self) -> Vec<Prior> {
        if !(self.prior_step > 0.0 && self.prior_step.is_finite())
            || !(self.prior_start.is_finite() && self.prior_stop.is_finite())
            || self.prior_stop <= self.prior_start
        {
            return Vec::new();
        }
        let n = ((self.prior_stop - self.prior_start) / self.prior_step).ceil() as usize;
        (0..n)
            .map(|i| self.prior_start + (i as f64) * self.prior_step)
            .filter(|v| *v < self.prior_stop)
            .map(Prior::Value)
            .collect()
    }
}

fn default_min_topics() -> usize {
    6
}
fn default_max_topics() -> usize {
    11
}
fn default_prior_start() -> f64 {
    0.01
}
fn default_prior_stop() -> f64 {
    1.0
}
fn default_prior_step() -> f64 {
    0.15
}
fn default_alpha_tags() -> Vec<Prior> {
    vec![Prior::Symmetric, Prior::Asymmetric]
}
fn default_beta_tags() -> Vec<Prior> {
    vec![Prior::Symmetric]
}

/// Auxiliary training settings held constant across a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    /// Documents sampled between topic-total refreshes.
    pub batch_size: usize,
    /// Full Gibbs sweeps over the corpus.
    pub passes: usize,
    pub per_word_topics: bool,
    /// Fixed-point steps when inferring a document's topic mixture.
    pub inference_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 100,
            batch_size: 100,
            passes: 10,
            per_word_topics: true,
            inference_iterations: 50,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.passes == 0 || self.inference_iterations == 0 {
            return Err(LdaError::InvalidConfig(
                "engine batch_size, passes and inference_iterations must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoherenceMeasure {
    #[serde(rename = "c_v")]
    Cv,
    #[serde(rename = "u_mass")]
    UMass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceConfig {
    pub measure: CoherenceMeasure,
    /// Top words per topic entering the score.
    pub top_n: usize,
    /// Sliding window length in tokens (c_v only).
    pub window_size: usize,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            measure: CoherenceMeasure::Cv,
            top_n: 20,
            window_size: 110,
        }
    }
}

impl CoherenceConfig {
    fn validate(&self) -> Result<()> {
        if self.top_n == 0 || self.window_size == 0 {
            return Err(LdaError::InvalidConfig(
                "coherence top_n and window_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Bigram detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhrasesConfig {
    pub enabled: bool,
    pub min_count: u64,
    pub threshold: f64,
    pub delimiter: String,
}

impl Default for PhrasesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_count: 5,
            threshold: 100.0,
            delimiter: "_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Split on whitespace; the input text is already cleaned.
    #[default]
    Whitespace,
    /// Lowercased runs of Unicode letters and marks.
    UnicodeWords,
}

/// Per-identity input tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// `{}` is replaced by the identity.
    pub path_template: String,
    pub text_column: String,
    pub cluster_column: String,
    /// Shuffle the combined documents (seeded with `engine.seed`).
    pub shuffle: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path_template: "../data/{}_data.csv".to_string(),
            text_column: "clean_text".to_string(),
            cluster_column: "lda_cluster".to_string(),
            shuffle: true,
        }
    }
}

impl DataConfig {
    pub fn path_for(&self, identity: &str) -> PathBuf {
        PathBuf::from(self.path_template.replacen("{}", identity, 1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub output_dir: PathBuf,
    /// Coordinate used for `symmetric` / `asymmetric` cells.
    pub placeholder: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            placeholder: 0.1,
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(crate::cache::DEFAULT_CACHE_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_reference_setup() {
        let config = TuningConfig::from_toml_str("").unwrap();
        assert_eq!(config.grid.min_topics, 6);
        assert_eq!(config.grid.max_topics, 11);
        assert_eq!(config.engine.seed, 100);
        assert_eq!(config.engine.batch_size, 100);
        assert_eq!(config.engine.passes, 10);
        assert!(config.engine.per_word_topics);
        assert_eq!(config.coherence.measure, CoherenceMeasure::Cv);
        assert_eq!(config.cache.path, PathBuf::from("lda_tuning_results.csv"));
        assert!(!config.parallel);
    }

    #[test]
    fn test_prior_values_stay_below_stop() {
        let values = GridConfig::default().prior_values();
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], Prior::Value(0.01));
        assert!(values.iter().all(|p| p.value().unwrap() < 1.0));
    }

    #[test]
    fn test_unusable_step_gives_no_values() {
        for step in [0.0, -0.3, f64::NAN, f64::INFINITY] {
            let grid = GridConfig {
                prior_step: step,
                ..GridConfig::default()
            };
            assert!(grid.prior_values().is_empty());
            assert!(grid.validate().is_err());
        }
    }

    #[test]
    fn test_coarse_step_gives_four_values() {
        let grid = GridConfig {
            prior_step: 0.3,
            ..GridConfig::default()
        };
        let values: Vec<f64> = grid.prior_values().iter().filter_map(Prior::value).collect();
        assert_eq!(values.len(), 4);
        assert!((values[3] - 0.91).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let text = r#"
            parallel = true
            tokenizer = "unicode_words"

            [grid]
            min_topics = 2
            max_topics = 4
            beta_tags = ["symmetric", "asymmetric"]

            [coherence]
            measure = "u_mass"
        "#;
        let config = TuningConfig::from_toml_str(text).unwrap();
        assert!(config.parallel);
        assert_eq!(config.tokenizer, TokenizerKind::UnicodeWords);
        assert_eq!(config.grid.min_topics, 2);
        assert_eq!(config.grid.beta_tags.len(), 2);
        assert_eq!(config.grid.alpha_tags, default_alpha_tags());
        assert_eq!(config.coherence.measure, CoherenceMeasure::UMass);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let result = TuningConfig::from_toml_str("[grid]\nmin_topics = 5\nmax_topics = 5\n");
        assert!(matches!(result, Err(LdaError::InvalidConfig(_))));

        let result = TuningConfig::from_toml_str("[engine]\npasses = 0\n");
        assert!(matches!(result, Err(LdaError::InvalidConfig(_))));
    }

    #[test]
    fn test_path_template() {
        let data = DataConfig::default();
        assert_eq!(
            data.path_for("alice"),
            PathBuf::from("../data/alice_data.csv")
        );
    }
}
