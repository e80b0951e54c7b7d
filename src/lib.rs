mod log_file;
mod math;
mod query;
mod thermo_run;

pub use log_file::{LogFile, LogParsingError};
pub use math::{format_sig, IteratorAvg};
pub use query::{
    AverageReport, ColumnAverage, FilteredView, Query, QueryError, QueryOutput, SeriesColumn,
};
pub use thermo_run::ThermoRun;
