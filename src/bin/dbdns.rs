//! Command line tool for the simulation database
//!
//! Quick look-ups and comparisons across every run in a database without
//! opening a notebook, plus ingestion of uiuj integrals into a run.
//!
//! # Usage
//!
//! ```text
//! Usage: dbdns <database> [options]
//! ```
//!
//! ## Options
//!
//! By default a summary of the simulations in the database is printed.
//!
//! ```bash
//! # List every simulation and how many metrics it has
//! dbdns db.json
//! ```
//!
//! ### Show one simulation
//!
//! ```bash
//! dbdns db.json --sim re5000
//! ```
//!
//! ### Compare a metric across simulations
//!
//! Keys are either a single name or `outer.inner` for nested values. The bulk
//! Reynolds number is looked up as both `reb` and `rew`.
//!
//! ```bash
//! # Tab separated problem, dataset, x and y for every simulation
//! dbdns db.json -x reb -y uv.prod
//!
//! # Scale x of Couette runs, and write the series to ./series/uv.prod_reb.dat
//! dbdns db.json -x reb -y uv.prod --factor 0.5 --series series
//! ```
//!
//! ### Ingest uiuj integrals
//!
//! ```bash
//! # Merge the integrals in ./uiuj/ into the re5000 record
//! dbdns db.json --sim re5000 --ingest uiuj --variant large
//! ```

// standard libraries
use std::path::PathBuf;

// crate modules
use chanpost::compare::{printout, write_series, CandidateKeys, Comparison};
use chanpost::database::{self, Database, KeyPath};
use chanpost::readers::read_integrals;
use chanpost::utils::*;

// external crates
use anyhow::{anyhow, Result};
use clap::Parser;
use itertools::Itertools;
use log::*;
use serde_json::Value;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make 'Info' the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    if let Some(dir) = &cli.ingest {
        ingest(&cli, dir)?;
    }

    match (&cli.x, &cli.y) {
        (Some(x), Some(y)) => compare(&cli, x, y)?,
        (None, None) => match &cli.sim {
            Some(sim) if cli.ingest.is_none() => show_simulation(&cli, sim)?,
            Some(_) => (),
            None => print_summary(&cli)?,
        },
        _ => return Err(anyhow!("Both -x and -y are needed for a comparison")),
    }

    Ok(())
}

/// Inspect and update a simulation database
///
/// The database is a JSON document mapping simulation names to records of
/// scalar results. Keys are given as a name or as 'outer.inner' for nested
/// values, e.g. 'meta.problem'.
///
/// Examples
/// --------
///
///  Summary of all simulations:
///     $ dbdns db.json
///
///  Show a single simulation:
///     $ dbdns db.json --sim re5000
///
///  Compare two metrics across all simulations:
///     $ dbdns db.json -x reb -y cf
///
///  Also write the series to ./out/cf_reb.dat:
///     $ dbdns db.json -x reb -y cf --series out
///
///  Merge uiuj integrals into a simulation:
///     $ dbdns db.json --sim re5000 --ingest path/to/uiuj
///
/// Notes
/// -----
///
/// Saving rewrites the whole document. Two saves at the same time will race
/// and the last one wins.
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: dbdns db.json -x reb -y cf\n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("dbdns <database> [options]")
)]
struct Cli {
    // * Positional
    /// Path to the database JSON file
    #[arg(name = "database")]
    database: PathBuf,

    /// Simulation to show or update
    #[arg(short, long, value_name = "id")]
    sim: Option<String>,

    /// Key for the x values of a comparison
    #[arg(help_heading("Comparison options"))]
    #[arg(short, value_name = "key")]
    x: Option<KeyPath>,

    /// Key for the y values of a comparison
    #[arg(help_heading("Comparison options"))]
    #[arg(short, value_name = "key")]
    y: Option<KeyPath>,

    /// Multiply x by this factor for Couette ('cou') runs
    #[arg(help_heading("Comparison options"))]
    #[arg(short, long, default_value_t = 1.0)]
    factor: f64,

    /// Also write the comparison to <dir>/<y>_<x>.dat
    #[arg(help_heading("Comparison options"))]
    #[arg(long, value_name = "dir")]
    series: Option<PathBuf>,

    /// Directory of uiuj integrals files to merge into --sim
    #[arg(help_heading("Ingest options"))]
    #[arg(long, value_name = "dir", requires = "sim")]
    ingest: Option<PathBuf>,

    /// uiuj variant suffix of the integrals files, e.g. 'large'
    #[arg(help_heading("Ingest options"))]
    #[arg(long, value_name = "name")]
    variant: Option<String>,

    /// Header lines before the column names
    #[arg(help_heading("Ingest options"))]
    #[arg(long, value_name = "n", default_value_t = 1)]
    head_len: usize,

    // * Flags
    /// Verbose logging (-v, -vv)
    ///
    /// If specified, the default log level of INFO is increased to DEBUG (-v)
    /// or TRACE (-vv). Errors and Warnings are always logged unless in quiet
    /// (-q) mode.
    #[arg(short, long)]
    #[arg(action = clap::ArgAction::Count)]
    verbose: u8,

    /// Supress all log output (overrules --verbose)
    #[arg(short, long)]
    quiet: bool,
}

/// Sets up logging at runtime to allow for multiple verbosity levels
#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![module_path!(), "chanpost"])
        .quiet(quiet)
        .verbosity(verbosity)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

/// Creates a banner for the command line
#[doc(hidden)]
fn banner() -> String {
    let mut s = f!("{:-<1$}\n", "", 70);
    s += &f!("{:^70}\n", "Chanpost :: Simulation Database");
    s += &f!("{:-<1$}", "", 70);
    s
}

#[doc(hidden)]
/// Merge integrals into the record of --sim
fn ingest(cli: &Cli, dir: &PathBuf) -> Result<()> {
    let sim = cli
        .sim
        .as_deref()
        .ok_or_else(|| anyhow!("--ingest needs a simulation, provide --sim"))?;

    info!("Reading integrals from {}", dir.display());
    let integrals = read_integrals(dir, cli.variant.as_deref(), cli.head_len)?;

    // start from the current record so other metrics survive the save
    let current = database::load_simulation(&cli.database, sim)?;
    let mut record = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => return Err(anyhow!("Record for {sim} is not a mapping")),
    };
    let terms = integrals.terms.len();
    record.extend(integrals.into_record());

    database::save_simulation(record, &cli.database, sim)?;
    info!("Merged {terms} integral terms into {sim}");
    Ok(())
}

#[doc(hidden)]
/// Print a comparison of two metrics
fn compare(cli: &Cli, x: &KeyPath, y: &KeyPath) -> Result<()> {
    let db = Database::load(&cli.database)?;
    let x = CandidateKeys::with_renames(x.clone());
    let y = CandidateKeys::with_renames(y.clone());

    let rows = Comparison::new(&db).factor(cli.factor).rows(&x, &y);
    info!("{} of {} simulations have both {} and {}", rows.len(), db.len(), x.primary(), y.primary());

    println!();
    println!("{}", printout(&rows));
    println!();

    if let Some(dir) = &cli.series {
        let path = write_series(&rows, dir, x.primary(), y.primary())?;
        info!("Series written to {}", path.display());
    }
    Ok(())
}

#[doc(hidden)]
/// Pretty print a single record
fn show_simulation(cli: &Cli, sim: &str) -> Result<()> {
    let record = database::load_simulation(&cli.database, sim)?;
    if record.is_empty() {
        warn!("No data for {sim} in {}", cli.database.display());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

#[doc(hidden)]
/// Write summary to the terminal
fn print_summary(cli: &Cli) -> Result<()> {
    let db = Database::load(&cli.database)?;
    let mut s = f!("{} simulations in {}\n", db.len(), cli.database.display());
    s += &db
        .iter()
        .map(|(sim, record)| f!("  {sim:<24} {:>3} entries", record.len()))
        .join("\n");
    println!("{s}");
    Ok(())
}
