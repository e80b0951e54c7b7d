use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

use crate::thermo_run::ThermoRun;

const HEADER_PREFIX: &str = "Step";

#[derive(Debug)]
pub enum LogParsingError {
    DuplicateColumns(String),
    InvalidThermoValue(String),
}

impl std::fmt::Display for LogParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for LogParsingError {}

/// A parsed log file: the thermo runs in file order.
pub struct LogFile {
    runs: Vec<ThermoRun>,
}

impl LogFile {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .context(format!("Reading {}", path.to_string_lossy()))?;
        Self::parse(&text)
    }

    /// Segment the log text into thermo runs.
    ///
    /// A run starts at a line beginning with `Step` and consumes following
    /// lines whose first token is numeric and whose token count matches the
    /// header. A blank line ends the run; any other non-matching line ends
    /// it too and is re-examined as a potential new header. Runs with zero
    /// data lines are dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let mut runs = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim();
            if !line.starts_with(HEADER_PREFIX) {
                i += 1;
                continue;
            }
            let columns: Vec<&str> = line.split_whitespace().collect();
            i += 1;
            let mut rows: Vec<Vec<f64>> = Vec::new();
            while i < lines.len() {
                let line = lines[i].trim();
                if line.is_empty() {
                    break;
                }
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens[0].parse::<f64>().is_err() || tokens.len() != columns.len() {
                    break;
                }
                // Only the first token was vetted above; a malformed later
                // token fails the whole parse.
                let row = tokens
                    .iter()
                    .map(|t| {
                        t.parse::<f64>().map_err(|_| {
                            anyhow!(LogParsingError::InvalidThermoValue(t.to_string()))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                rows.push(row);
                i += 1;
            }
            if !rows.is_empty() {
                let run = ThermoRun::new(&columns, &rows)?;
                debug!(
                    "run {}: {} rows, {} columns",
                    runs.len() + 1,
                    run.rows_count(),
                    run.columns_count()
                );
                runs.push(run);
            }
        }
        Ok(Self { runs })
    }

    #[must_use]
    pub fn runs(&self) -> &[ThermoRun] {
        &self.runs
    }
}
