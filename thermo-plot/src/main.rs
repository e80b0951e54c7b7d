use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use lammps_log_rust::{format_sig, LogFile, Query};
use log::debug;
use std::path::PathBuf;

mod plot;
use plot::plot_series;

/// Read a LAMMPS log file and list, average or plot thermo columns from a
/// chosen run.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// LAMMPS log file (e.g. log.lammps)
    #[arg(value_name = "LOG_FILE")]
    logfile: PathBuf,

    /// 1-based index of the run to use
    #[arg(short, long, default_value_t = 1)]
    run: usize,

    /// Column used for the x-axis and range filtering
    #[arg(short, long, default_value = "Step")]
    x: String,

    /// One or more y-axis columns to plot (e.g. Temp Press PotEng)
    #[arg(short, long, num_args = 1..)]
    y: Vec<String>,

    /// List detected runs and their columns, then exit unless --y or
    /// --avg-cols was also given
    #[arg(short, long)]
    list: bool,

    /// Minimum x value (inclusive) to include for plotting/averaging
    #[arg(long)]
    x_min: Option<f64>,

    /// Maximum x value (inclusive) to include for plotting/averaging
    #[arg(long)]
    x_max: Option<f64>,

    /// One or more columns to average over the selected x-range
    #[arg(short, long, num_args = 1..)]
    avg_cols: Vec<String>,

    /// Also report the standard deviation of each averaged column
    #[arg(long)]
    std: bool,

    /// Where to save the plot
    #[arg(short, long, default_value = "thermo.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let log_file = LogFile::read(&cli.logfile)?;
    debug!("parsed {} run(s)", log_file.runs().len());

    if log_file.runs().is_empty() {
        println!("No thermo runs (Step headers) found in the log file.");
        return Ok(());
    }

    if cli.list {
        println!(
            "Found {} thermo run(s) in {}:",
            log_file.runs().len(),
            cli.logfile.display()
        );
        for (idx, run) in log_file.runs().iter().enumerate() {
            println!(
                "\nRun {}: {} rows, columns:\n  {}",
                idx + 1,
                run.rows_count(),
                run.columns().iter().join("  ")
            );
        }
        if cli.y.is_empty() && cli.avg_cols.is_empty() {
            return Ok(());
        }
    }

    let query = Query {
        run_index: cli.run,
        x_column: cli.x.clone(),
        x_min: cli.x_min,
        x_max: cli.x_max,
        y_columns: cli.y.clone(),
        avg_columns: cli.avg_cols.clone(),
    };
    let output = match query.evaluate(&log_file) {
        Ok(output) => output,
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };

    if let Some(report) = &output.averages {
        println!(
            "Averages for run {} over {} in [{}, {}]:",
            report.run_index, report.x_column, report.x_lo, report.x_hi
        );
        for column in &report.columns {
            if cli.std {
                println!(
                    "  {}: {} (std {})",
                    column.name,
                    format_sig(column.mean, 6),
                    format_sig(column.std, 6)
                );
            } else {
                println!("  {}: {}", column.name, format_sig(column.mean, 6));
            }
        }
    }

    if !output.series.is_empty() {
        let mut title = format!("{} - run {}", cli.logfile.display(), cli.run);
        if cli.x_min.is_some() || cli.x_max.is_some() {
            title += &format!(" (filtered {})", cli.x);
        }
        plot_series(&cli.output, &title, &cli.x, &output.series)?;
        println!("Saved plot to {}", cli.output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["thermo-plot", "log.lammps"]);
        assert_eq!(cli.run, 1);
        assert_eq!(cli.x, "Step");
        assert!(cli.y.is_empty());
        assert!(cli.avg_cols.is_empty());
        assert!(!cli.list);
        assert_eq!(cli.x_min, None);
        assert_eq!(cli.x_max, None);
    }

    #[test]
    fn cli_multi_value_columns() {
        let cli = Cli::parse_from([
            "thermo-plot",
            "log.lammps",
            "--run",
            "2",
            "-y",
            "Temp",
            "Press",
            "--avg-cols",
            "Temp",
            "--x-min",
            "10000",
            "--x-max",
            "20000",
        ]);
        assert_eq!(cli.run, 2);
        assert_eq!(cli.y, vec!["Temp", "Press"]);
        assert_eq!(cli.avg_cols, vec!["Temp"]);
        assert_eq!(cli.x_min, Some(10000.0));
        assert_eq!(cli.x_max, Some(20000.0));
    }
}
