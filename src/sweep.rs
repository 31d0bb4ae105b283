//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Grid search over (topic count, alpha, beta).
//!
//! Every point of the Cartesian grid is scored once, topic count outermost
//! and beta innermost. The table keeps that order whether evaluation runs
//! sequentially or on the rayon pool.

use std::ops::Range;
use std::sync::Mutex;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GridConfig;
use crate::error::{LdaError, Result};
use crate::evaluator::CoherenceEvaluator;
use crate::params::{HyperParams, Prior};

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub topics: Range<usize>,
    pub alphas: Vec<Prior>,
    pub betas: Vec<Prior>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::build(&GridConfig::default())
    }
}

impl Grid {
    pub fn new(topics: Range<usize>, alphas: Vec<Prior>, betas: Vec<Prior>) -> Self {
        Self {
            topics,
            alphas,
            betas,
        }
    }

    /// Validates `config` first, so a bad prior range is an error rather
    /// than an empty or unbounded grid.
    pub fn from_config(config: &GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &GridConfig) -> Self {
        let values = config.prior_values();
        let mut alphas = values.clone();
        alphas.extend(config.alpha_tags.iter().copied());
        let mut betas = values;
        betas.extend(config.beta_tags.iter().copied());
        Self::new(config.min_topics..config.max_topics, alphas, betas)
    }

    pub fn len(&self) -> usize {
        self.topics.len() * self.alphas.len() * self.betas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> Vec<HyperParams> {
        let mut points = Vec::with_capacity(self.len());
        for k in self.topics.clone() {
            for a in &self.alphas {
                for b in &self.betas {
                    points.push(HyperParams::new(k, *a, *b));
                }
            }
        }
        points
    }
}

/// One evaluated grid point, in the cache file's column layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    #[serde(rename = "Topics")]
    pub topics: usize,
    #[serde(rename = "Alpha")]
    pub alpha: Prior,
    #[serde(rename = "Beta")]
    pub beta: Prior,
    #[serde(rename = "Coherence")]
    pub coherence: f64,
}

impl SweepRow {
    pub fn new(params: HyperParams, coherence: f64) -> Self {
        Self {
            topics: params.topics,
            alpha: params.alpha,
            beta: params.beta,
            coherence,
        }
    }

    pub fn params(&self) -> HyperParams {
        HyperParams::new(self.topics, self.alpha, self.beta)
    }
}

/// Append-only results in evaluation order. Duplicates are not rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepTable {
    rows: Vec<SweepRow>,
}

impl SweepTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn from_rows(rows: Vec<SweepRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: SweepRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest coherence, first occurrence on ties. NaN never wins.
    pub fn best(&self) -> Option<&SweepRow> {
        let mut best: Option<&SweepRow> = None;
        for row in &self.rows {
            if row.coherence.is_nan() {
                continue;
            }
            match best {
                Some(b) if row.coherence <= b.coherence => {}
                _ => best = Some(row),
            }
        }
        best
    }

    pub fn with_topics(&self, topics: usize) -> impl Iterator<Item = &SweepRow> {
        self.rows.iter().filter(move |r| r.topics == topics)
    }

    /// Whether the rows are exactly the grid's points in grid order.
    pub fn matches_grid(&self, grid: &Grid) -> bool {
        self.rows.len() == grid.len()
            && self
                .rows
                .iter()
                .zip(grid.points())
                .all(|(row, point)| row.params() == point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

pub type ProgressFn = Box<dyn Fn(Progress) + Send + Sync>;

pub struct SweepOutcome {
    pub table: SweepTable,
    pub best: SweepRow,
}

pub struct Sweep {
    grid: Grid,
    parallel: bool,
    on_progress: Option<ProgressFn>,
}

impl Sweep {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            parallel: false,
            on_progress: None,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn on_progress(mut self, f: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Scores every grid point; the first evaluator error aborts the sweep.
    pub fn run<E: CoherenceEvaluator + ?Sized>(&self, evaluator: &E) -> Result<SweepOutcome> {
        let points = self.grid.points();
        let total = points.len();
        info!(
            total,
            topics = ?self.grid.topics,
            alphas = self.grid.alphas.len(),
            betas = self.grid.betas.len(),
            parallel = self.parallel,
            "starting hyperparameter sweep"
        );

        let completed = Mutex::new(0usize);
        let score = |params: &HyperParams| -> Result<SweepRow> {
            let coherence = evaluator.evaluate(params)?;
            self.advance(&completed, total);
            Ok(SweepRow::new(*params, coherence))
        };

        let table = if self.parallel {
            SweepTable::from_rows(points.par_iter().map(score).collect::<Result<Vec<_>>>()?)
        } else {
            let mut table = SweepTable::with_capacity(total);
            for params in &points {
                table.push(score(params)?);
            }
            table
        };

        let best = *table
            .best()
            .ok_or_else(|| LdaError::NoResults("sweep produced no comparable scores".into()))?;
        info!(
            "Best coherence: {} (alpha: {}, beta: {}, topics: {})",
            best.coherence, best.alpha, best.beta, best.topics
        );

        Ok(SweepOutcome { table, best })
    }

    fn advance(&self, completed: &Mutex<usize>, total: usize) {
        // held while reporting so observers see a strictly increasing count
        let mut done = match completed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *done += 1;
        info!(completed = *done, total, "sweep progress");
        if let Some(f) = &self.on_progress {
            f(Progress {
                completed: *done,
                total,
            });
        }
    }
}
