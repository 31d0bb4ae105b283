//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Flat CSV cache of sweep results (`Topics,Alpha,Beta,Coherence`).
//!
//! The file is written and read whole. A cached table from a different grid
//! is still used; the mismatch is only logged.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{LdaError, Result};
use crate::evaluator::CoherenceEvaluator;
use crate::sweep::{Sweep, SweepRow, SweepTable};

pub const DEFAULT_CACHE_FILE: &str = "lda_tuning_results.csv";

pub const COLUMNS: [&str; 4] = ["Topics", "Alpha", "Beta", "Coherence"];

pub struct ResultCache {
    path: PathBuf,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl ResultCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Overwrites any previous file.
    pub fn store(&self, table: &SweepTable) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        for row in table.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!(path = %self.path.display(), rows = table.len(), "sweep results written");
        Ok(())
    }

    pub fn load(&self) -> Result<SweepTable> {
        read_table(&self.path)
    }

    /// Best row from the cache, or from a fresh sweep when `force_recompute`
    /// is set or no cache file exists. A fresh sweep rewrites the file.
    pub fn load_or_compute<E: CoherenceEvaluator + ?Sized>(
        &self,
        evaluator: &E,
        sweep: &Sweep,
        force_recompute: bool,
    ) -> Result<SweepRow> {
        if force_recompute || !self.exists() {
            info!(
                path = %self.path.display(),
                force_recompute,
                "starting hyperparameter tuning"
            );
            let outcome = sweep.run(evaluator)?;
            self.store(&outcome.table)?;
            return Ok(outcome.best);
        }

        let table = self.load()?;
        if !table.matches_grid(sweep.grid()) {
            warn!(
                path = %self.path.display(),
                cached_rows = table.len(),
                grid_points = sweep.grid().len(),
                "cached sweep does not match the configured grid, using it anyway"
            );
        }
        let best = table.best().copied().ok_or_else(|| {
            LdaError::NoResults(format!("{} holds no usable rows", self.path.display()))
        })?;
        info!(
            "Cached best coherence: {} (alpha: {}, beta: {}, topics: {})",
            best.coherence, best.alpha, best.beta, best.topics
        );
        Ok(best)
    }
}

/// Reads a whole results table; Alpha/Beta cells parse as floats or tags.
pub fn read_table(path: impl AsRef<Path>) -> Result<SweepTable> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut table = SweepTable::default();
    for row in reader.deserialize::<SweepRow>() {
        table.push(row?);
    }
    Ok(table)
}
