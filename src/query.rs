use itertools::Itertools;
use std::fmt;

use crate::log_file::LogFile;
use crate::math::IteratorAvg;
use crate::thermo_run::ThermoRun;

/// A request against one run of a parsed log file.
pub struct Query {
    pub run_index: usize,
    pub x_column: String,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_columns: Vec<String>,
    pub avg_columns: Vec<String>,
}

#[derive(Debug)]
pub enum QueryError {
    RunIndexOutOfRange {
        requested: usize,
        count: usize,
    },
    UnknownXColumn {
        column: String,
        run_index: usize,
        available: Vec<String>,
    },
    UnknownYColumns {
        missing: Vec<String>,
        run_index: usize,
        available: Vec<String>,
    },
    UnknownAvgColumns {
        missing: Vec<String>,
        run_index: usize,
        available: Vec<String>,
    },
    NothingRequested,
    EmptyRange,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunIndexOutOfRange { requested, count } => write!(
                f,
                "Requested run index {requested} is out of range. File has {count} run(s)."
            ),
            Self::UnknownXColumn {
                column,
                run_index,
                available,
            } => write!(
                f,
                "x-axis column '{column}' not found in run {run_index}.\nAvailable columns: {}",
                available.iter().join(", ")
            ),
            Self::UnknownYColumns {
                missing,
                run_index,
                available,
            } => write!(
                f,
                "The following y-axis columns were not found in run {run_index}:\n  {}\nAvailable columns: {}",
                missing.iter().join(", "),
                available.iter().join(", ")
            ),
            Self::UnknownAvgColumns {
                missing,
                run_index,
                available,
            } => write!(
                f,
                "The following --avg-cols were not found in run {run_index}:\n  {}\nAvailable columns: {}",
                missing.iter().join(", "),
                available.iter().join(", ")
            ),
            Self::NothingRequested => write!(
                f,
                "Nothing to do: provide at least one --y column for plotting or at least one --avg-cols column for averaging."
            ),
            Self::EmptyRange => write!(f, "No data left after applying x-range filters."),
        }
    }
}

impl std::error::Error for QueryError {}

/// Rows of a run whose x value lies within the requested bounds.
pub struct FilteredView<'a> {
    x: &'a [f64],
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    #[must_use]
    pub fn new(x: &'a [f64], x_min: Option<f64>, x_max: Option<f64>) -> Self {
        let indices = x
            .iter()
            .enumerate()
            .filter(|(_, &v)| {
                x_min.is_none_or(|lo| v >= lo) && x_max.is_none_or(|hi| v <= hi)
            })
            .map(|(i, _)| i)
            .collect();
        Self { x, indices }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Min and max x value actually present in the view.
    #[must_use]
    pub fn x_range(&self) -> (f64, f64) {
        self.indices.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &i| (lo.min(self.x[i]), hi.max(self.x[i])),
        )
    }

    pub fn values<'b>(&'b self, column: &'b [f64]) -> impl Iterator<Item = f64> + 'b {
        self.indices.iter().map(move |&i| column[i])
    }

    /// `(x, column)` pairs in row order.
    #[must_use]
    pub fn series(&self, column: &[f64]) -> Vec<(f64, f64)> {
        self.indices.iter().map(|&i| (self.x[i], column[i])).collect()
    }
}

pub struct ColumnAverage {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Means over the filtered view, with the effective x-range they cover.
pub struct AverageReport {
    pub run_index: usize,
    pub x_column: String,
    pub x_lo: f64,
    pub x_hi: f64,
    pub columns: Vec<ColumnAverage>,
}

pub struct SeriesColumn {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

pub struct QueryOutput {
    pub averages: Option<AverageReport>,
    pub series: Vec<SeriesColumn>,
}

impl Query {
    /// Resolve the query against a parsed log file.
    ///
    /// Validation order: run index, then every requested column (x, y, avg)
    /// so missing names are reported all at once, then the empty-request
    /// check, then the range filter.
    pub fn evaluate(&self, log_file: &LogFile) -> Result<QueryOutput, QueryError> {
        let runs = log_file.runs();
        if self.run_index < 1 || self.run_index > runs.len() {
            return Err(QueryError::RunIndexOutOfRange {
                requested: self.run_index,
                count: runs.len(),
            });
        }
        let run = &runs[self.run_index - 1];

        if run.column_index(&self.x_column).is_none() {
            return Err(QueryError::UnknownXColumn {
                column: self.x_column.clone(),
                run_index: self.run_index,
                available: column_names(run),
            });
        }
        let missing = missing_columns(run, &self.y_columns);
        if !missing.is_empty() {
            return Err(QueryError::UnknownYColumns {
                missing,
                run_index: self.run_index,
                available: column_names(run),
            });
        }
        let missing = missing_columns(run, &self.avg_columns);
        if !missing.is_empty() {
            return Err(QueryError::UnknownAvgColumns {
                missing,
                run_index: self.run_index,
                available: column_names(run),
            });
        }

        if self.y_columns.is_empty() && self.avg_columns.is_empty() {
            return Err(QueryError::NothingRequested);
        }

        let view = FilteredView::new(run.column(&self.x_column), self.x_min, self.x_max);
        if view.is_empty() {
            return Err(QueryError::EmptyRange);
        }

        let averages = if self.avg_columns.is_empty() {
            None
        } else {
            let (view_lo, view_hi) = view.x_range();
            let columns = self
                .avg_columns
                .iter()
                .map(|name| {
                    let (mean, std) = view
                        .values(run.column(name))
                        .avg_with_std()
                        .ok_or(QueryError::EmptyRange)?;
                    Ok(ColumnAverage {
                        name: name.clone(),
                        mean,
                        std,
                    })
                })
                .collect::<Result<Vec<_>, QueryError>>()?;
            Some(AverageReport {
                run_index: self.run_index,
                x_column: self.x_column.clone(),
                x_lo: self.x_min.unwrap_or(view_lo),
                x_hi: self.x_max.unwrap_or(view_hi),
                columns,
            })
        };

        let series = self
            .y_columns
            .iter()
            .map(|name| SeriesColumn {
                name: name.clone(),
                points: view.series(run.column(name)),
            })
            .collect();

        Ok(QueryOutput { averages, series })
    }
}

fn column_names(run: &ThermoRun) -> Vec<String> {
    run.columns().into_iter().cloned().collect()
}

fn missing_columns(run: &ThermoRun, requested: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| run.column_index(name).is_none())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_float_absolute_eq;

    const LOG_TEXT: &str = "Step Temp Press
0 300.0 1.0
100 301.5 1.1
200 299.8 0.9

Step Temp Press
0 310.0 2.0
100 311.0 2.1
";

    fn query(run_index: usize) -> Query {
        Query {
            run_index,
            x_column: "Step".to_string(),
            x_min: None,
            x_max: None,
            y_columns: Vec::new(),
            avg_columns: Vec::new(),
        }
    }

    #[test]
    fn filter_is_inclusive_on_both_bounds() {
        let x = [0.0, 100.0, 200.0, 300.0];
        let view = FilteredView::new(&x, Some(100.0), Some(200.0));
        assert_eq!(view.len(), 2);
        assert_eq!(view.x_range(), (100.0, 200.0));
        let view = FilteredView::new(&x, None, Some(100.0));
        assert_eq!(view.len(), 2);
        let view = FilteredView::new(&x, Some(100.0), None);
        assert_eq!(view.len(), 3);
        let view = FilteredView::new(&x, None, None);
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn average_over_restricted_range() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let mut q = query(1);
        q.x_min = Some(0.0);
        q.x_max = Some(100.0);
        q.avg_columns = vec!["Temp".to_string()];
        let output = q.evaluate(&log_file).unwrap();
        let report = output.averages.unwrap();
        let temp = &report.columns[0];
        assert_eq!(temp.name, "Temp");
        assert_float_absolute_eq!(temp.mean, 300.75, 1e-12);
        assert_float_absolute_eq!(report.x_lo, 0.0, 1e-12);
        assert_float_absolute_eq!(report.x_hi, 100.0, 1e-12);
    }

    #[test]
    fn average_of_single_row_is_the_value() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let mut q = query(2);
        q.x_min = Some(100.0);
        q.avg_columns = vec!["Press".to_string()];
        let output = q.evaluate(&log_file).unwrap();
        let report = output.averages.unwrap();
        assert_float_absolute_eq!(report.columns[0].mean, 2.1, 1e-12);
        assert_float_absolute_eq!(report.columns[0].std, 0.0, 1e-12);
    }

    #[test]
    fn average_of_constant_column() {
        let log_file =
            LogFile::parse("Step E\n0 -8.5\n100 -8.5\n200 -8.5\n").unwrap();
        let mut q = query(1);
        q.avg_columns = vec!["E".to_string()];
        let output = q.evaluate(&log_file).unwrap();
        assert_float_absolute_eq!(output.averages.unwrap().columns[0].mean, -8.5, 1e-12);
    }

    #[test]
    fn effective_range_falls_back_to_view_extent() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let mut q = query(1);
        q.x_min = Some(100.0);
        q.avg_columns = vec!["Temp".to_string()];
        let report = q.evaluate(&log_file).unwrap().averages.unwrap();
        assert_float_absolute_eq!(report.x_lo, 100.0, 1e-12);
        // no upper bound supplied; the max x of the view is reported
        assert_float_absolute_eq!(report.x_hi, 200.0, 1e-12);
    }

    #[test]
    fn series_pairs_in_row_order() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let mut q = query(2);
        q.y_columns = vec!["Temp".to_string(), "Press".to_string()];
        let output = q.evaluate(&log_file).unwrap();
        assert!(output.averages.is_none());
        assert_eq!(output.series.len(), 2);
        assert_eq!(output.series[0].points, vec![(0.0, 310.0), (100.0, 311.0)]);
        assert_eq!(output.series[1].points, vec![(0.0, 2.0), (100.0, 2.1)]);
    }

    #[test]
    fn run_index_out_of_range() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        for run_index in [0, 3] {
            let mut q = query(run_index);
            q.y_columns = vec!["Temp".to_string()];
            match q.evaluate(&log_file) {
                Err(QueryError::RunIndexOutOfRange { requested, count }) => {
                    assert_eq!(requested, run_index);
                    assert_eq!(count, 2);
                }
                _ => panic!("expected RunIndexOutOfRange"),
            }
        }
    }

    #[test]
    fn unknown_columns_list_available() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let mut q = query(1);
        q.x_column = "Time".to_string();
        q.y_columns = vec!["Temp".to_string()];
        match q.evaluate(&log_file) {
            Err(QueryError::UnknownXColumn { column, available, .. }) => {
                assert_eq!(column, "Time");
                assert_eq!(available, vec!["Step", "Temp", "Press"]);
            }
            _ => panic!("expected UnknownXColumn"),
        }

        let mut q = query(1);
        q.y_columns = vec!["Temp".to_string(), "Volume".to_string(), "Density".to_string()];
        match q.evaluate(&log_file) {
            Err(QueryError::UnknownYColumns { missing, .. }) => {
                assert_eq!(missing, vec!["Volume", "Density"]);
            }
            _ => panic!("expected UnknownYColumns"),
        }

        let mut q = query(1);
        q.avg_columns = vec!["Enthalpy".to_string()];
        match q.evaluate(&log_file) {
            Err(QueryError::UnknownAvgColumns { missing, run_index, .. }) => {
                assert_eq!(missing, vec!["Enthalpy"]);
                assert_eq!(run_index, 1);
            }
            _ => panic!("expected UnknownAvgColumns"),
        }
    }

    #[test]
    fn empty_range_is_reported() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let mut q = query(1);
        q.x_min = Some(1000.0);
        q.avg_columns = vec!["Temp".to_string()];
        assert!(matches!(q.evaluate(&log_file), Err(QueryError::EmptyRange)));
    }

    #[test]
    fn nothing_requested_is_reported() {
        let log_file = LogFile::parse(LOG_TEXT).unwrap();
        let q = query(1);
        assert!(matches!(
            q.evaluate(&log_file),
            Err(QueryError::NothingRequested)
        ));
    }
}
