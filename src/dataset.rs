//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Per-identity document tables.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::error::{LdaError, Result};

/// A CSV table with headers, kept whole so a column can be written back.
pub struct Dataset {
    path: PathBuf,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Dataset {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let headers = reader.headers()?.clone();
        let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(path = %path.display(), rows = records.len(), "dataset read");
        Ok(Self {
            path,
            headers,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Cells of `column`; short rows yield the empty string.
    pub fn column(&self, column: &str) -> Result<Vec<String>> {
        let idx = self.column_index(column).ok_or_else(|| LdaError::MissingColumn {
            column: column.to_string(),
            path: self.path.display().to_string(),
        })?;
        Ok(self
            .records
            .iter()
            .map(|r| r.get(idx).unwrap_or("").to_string())
            .collect())
    }

    /// Replaces `column` or appends it when absent.
    pub fn set_column<T: ToString>(&mut self, column: &str, values: &[T]) -> Result<()> {
        if values.len() != self.records.len() {
            return Err(LdaError::InvalidConfig(format!(
                "{} values for {} rows of {}",
                values.len(),
                self.records.len(),
                self.path.display()
            )));
        }

        let width = self.headers.len();
        let idx = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                self.headers.push_field(column);
                width
            }
        };

        for (record, value) in self.records.iter_mut().zip(values) {
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            if fields.len() <= idx {
                fields.resize(idx + 1, String::new());
            }
            fields[idx] = value.to_string();
            *record = StringRecord::from(fields);
        }
        Ok(())
    }

    pub fn write(&self) -> Result<()> {
        self.write_to(&self.path)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path.as_ref())?;
        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
