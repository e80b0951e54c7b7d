use std::collections::HashMap;
use std::fmt;

use crate::log_file::LogParsingError;

/// One thermo block of a log file: a fixed set of named columns with
/// equal-length numeric data, immutable once constructed.
pub struct ThermoRun {
    keys: HashMap<String, usize>,
    rows_count: usize,
    values: Vec<f64>,
}

impl ThermoRun {
    pub(crate) fn new(columns: &[&str], rows: &[Vec<f64>]) -> Result<Self, LogParsingError> {
        let mut keys = HashMap::new();
        for column in columns {
            if keys.insert((*column).to_string(), keys.len()).is_some() {
                return Err(LogParsingError::DuplicateColumns((*column).to_string()));
            }
        }
        let rows_count = rows.len();
        let mut run = Self {
            values: vec![0.0; rows_count * keys.len()],
            keys,
            rows_count,
        };
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                run.values[rows_count * j + i] = *value;
            }
        }
        Ok(run)
    }

    /// Column names in header order.
    #[must_use]
    pub fn columns(&self) -> Vec<&String> {
        let mut entries: Vec<(&String, &usize)> = self.keys.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1));
        entries.into_iter().map(|i| i.0).collect()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.keys.get(name).copied()
    }

    /// Values of one column in row order. The name must exist.
    #[must_use]
    pub fn column(&self, name: &str) -> &[f64] {
        let start = self.keys[name] * self.rows_count;
        &self.values[start..start + self.rows_count]
    }

    #[inline]
    #[must_use]
    pub fn rows_count(&self) -> usize {
        self.rows_count
    }

    #[inline]
    #[must_use]
    pub fn columns_count(&self) -> usize {
        self.keys.len()
    }
}

impl fmt::Debug for ThermoRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThermoRun")
            .field("rows_count", &self.rows_count)
            .field("keys", &self.keys)
            .finish()
    }
}
