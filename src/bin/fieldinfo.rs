//! Command line tool to inspect binary field dumps
//!
//! Binary field files have no header, so checking that a dump is what you
//! think it is usually means firing up a notebook. This reads the file against
//! its grid, reports the shape, mesh extents and the range of every component,
//! and optionally writes the mesh out as JSON.
//!
//! # Usage
//!
//! ```text
//! Usage: fieldinfo <file> (--info <path> | --dns <path>) [options]
//! ```
//!
//! ## Options
//!
//! ### Grid from an info file
//!
//! ```bash
//! # Summary of a velocity export from out2bin
//! fieldinfo vel.bin --info vel.nfo
//! ```
//!
//! ### Grid from solver parameters
//!
//! The spectral grid is given as a small JSON file with `nx`, `ny`, `nz`,
//! `alfa0`, `beta0`, `a`, `ymin` and `ymax`.
//!
//! ```bash
//! # Six component tensor field in the component-major layout
//! fieldinfo stress.bin --dns grid.json --convention channel --components 6
//! ```
//!
//! ### Large files
//!
//! ```bash
//! # Memory map instead of reading, and refuse eager reads over 2 GiB
//! fieldinfo vel.bin --info vel.nfo --lazy
//! fieldinfo vel.bin --info vel.nfo --budget 2048
//! ```

// standard libraries
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

// crate modules
use chanpost::field::{FieldData, FieldView};
use chanpost::memory::FixedBudget;
use chanpost::mesh::{build_mesh, DnsParams, GridParams, Mesh};
use chanpost::readers::{read_info_file, Convention, FieldReader};
use chanpost::utils::*;

// external crates
use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::*;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make 'Info' the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    let grid = resolve_grid(&cli)?;
    let mesh = build_mesh(&grid)?;
    debug!("{mesh}");

    let reader = reader_init(&cli);
    info!("Reading {}", cli.file.display());
    let field = match cli.lazy {
        true => FieldData::Lazy(reader.map(&cli.file, &grid)?),
        false => FieldData::Eager(reader.read(&cli.file, &grid)?),
    };

    if !cli.quiet {
        print_summary(&field, &mesh)?;
    }

    if let Some(path) = &cli.json {
        write_mesh_json(&mesh, path)?;
    }

    Ok(())
}

/// Inspect headerless binary field dumps
///
/// Reads a binary field file against its grid and reports the shape, the mesh
/// extents, and the minimum and maximum of every component.
///
/// Examples
/// --------
///
///  Velocity export with an info file:
///     $ fieldinfo vel.bin --info vel.nfo
///
///  Tensor field on a spectral grid:
///     $ fieldinfo stress.bin --dns grid.json -c 6 --convention channel
///
///  Memory map rather than read:
///     $ fieldinfo vel.bin --info vel.nfo --lazy
///
///  Write the mesh coordinates to JSON:
///     $ fieldinfo vel.bin --info vel.nfo --json mesh.json
///
/// Notes
/// -----
///
/// The byte order defaults to the native order of the machine, which can be
/// changed with --endian.
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: fieldinfo vel.bin --info vel.nfo\n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("fieldinfo <file> (--info <path> | --dns <path>) [options]")
)]
struct Cli {
    // * Positional
    /// Path to binary field file
    #[arg(name = "file")]
    file: PathBuf,

    /// Grid info file written by the exporter
    #[arg(help_heading("Grid options"))]
    #[arg(short, long, value_name = "path", conflicts_with = "dns")]
    info: Option<PathBuf>,

    /// JSON file with the spectral grid parameters
    #[arg(help_heading("Grid options"))]
    #[arg(short, long, value_name = "path")]
    dns: Option<PathBuf>,

    /// Tool that wrote the binary
    ///
    /// 'brutalbin' files are (z, y, x, component), 'channel' files are
    /// (component, z, y, x).
    #[arg(help_heading("Field options"))]
    #[arg(long, value_enum, default_value = "brutalbin")]
    convention: ConventionArg,

    /// Number of components per grid point
    #[arg(help_heading("Field options"))]
    #[arg(short, long, value_name = "n")]
    components: Option<usize>,

    /// Byte order of the file
    #[arg(help_heading("Field options"))]
    #[arg(long, value_enum, default_value = "native")]
    endian: EndianArg,

    /// Memory map the file instead of reading it
    #[arg(help_heading("Field options"))]
    #[arg(long)]
    lazy: bool,

    /// Refuse eager reads larger than this many MiB
    #[arg(help_heading("Field options"))]
    #[arg(long, value_name = "MiB")]
    budget: Option<u64>,

    /// Write the mesh coordinates to a JSON file
    #[arg(help_heading("Output options"))]
    #[arg(short, long, value_name = "path")]
    json: Option<PathBuf>,

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

#[doc(hidden)]
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConventionArg {
    Brutalbin,
    Channel,
}

impl From<ConventionArg> for Convention {
    fn from(value: ConventionArg) -> Self {
        match value {
            ConventionArg::Brutalbin => Convention::Brutalbin,
            ConventionArg::Channel => Convention::Channel,
        }
    }
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EndianArg {
    Native,
    Little,
    Big,
}

impl From<EndianArg> for chanpost::field::ByteOrder {
    fn from(value: EndianArg) -> Self {
        use chanpost::field::ByteOrder;
        match value {
            EndianArg::Native => ByteOrder::Native,
            EndianArg::Little => ByteOrder::Little,
            EndianArg::Big => ByteOrder::Big,
        }
    }
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
    s += &f!("{:^70}\n", "Chanpost :: Field Inspector");
    s += &f!("{:-<1$}", "", 70);
    s
}

#[doc(hidden)]
fn resolve_grid(cli: &Cli) -> Result<GridParams> {
    match (&cli.info, &cli.dns) {
        (Some(info), _) => Ok(read_info_file(info)?),
        (None, Some(dns)) => {
            let file = File::open(dns).with_context(|| f!("Could not open {}", dns.display()))?;
            let params: DnsParams = serde_json::from_reader(file)
                .with_context(|| f!("Invalid grid parameters in {}", dns.display()))?;
            Ok(GridParams::from_dns(&params))
        }
        (None, None) => Err(anyhow!("A grid is required, provide --info or --dns")),
    }
}

#[doc(hidden)]
fn reader_init(cli: &Cli) -> FieldReader {
    let mut reader = FieldReader::new(cli.convention.into());
    if let Some(n) = cli.components {
        reader.set_components(n);
    }
    if let Some(mib) = cli.budget {
        reader.set_memory_budget(FixedBudget::from_mib(mib));
    }
    reader.set_byte_order(cli.endian.into());
    if cli.quiet {
        reader.disable_progress();
    }
    reader
}

#[doc(hidden)]
/// Write summary to the terminal
fn print_summary(field: &FieldData, mesh: &Mesh) -> Result<()> {
    let shape = field.shape();
    let mut s = "Summary of binary file\n".to_string();
    s += &f!("shape  : {shape}\n");
    s += &f!("values : {}\n", shape.len());
    s += &f!("points : {}\n", mesh.params().number_of_points());
    s += &f!("{mesh}\n");
    for c in 0..shape.components() {
        let values = field.component_values(c)?;
        match f64_range(&values) {
            Some((lo, hi)) => s += &f!("comp {c} : {} to {}\n", lo.sci(5, 2), hi.sci(5, 2)),
            None => s += &f!("comp {c} : no finite values\n"),
        }
    }
    print!("{s}");
    Ok(())
}

#[doc(hidden)]
/// Write mesh to json
fn write_mesh_json(mesh: &Mesh, path: &PathBuf) -> Result<()> {
    debug!("Writing mesh JSON to {}", path.display());
    let file = File::create(path).with_context(|| f!("Could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, mesh)?;
    writer
        .flush()
        .with_context(|| f!("Could not write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_json_is_complete_on_return() {
        let grid = GridParams {
            nx_total: 64,
            nz_total: 32,
            dx: 0.1,
            dz: 0.2,
            ny: 128,
            ny_total: 129,
            a: 1.6,
            ymin: -1.0,
            ymax: 1.0,
        };
        let mesh = build_mesh(&grid).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.json");
        write_mesh_json(&mesh, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["x"].as_array().unwrap().len(), 64);
        assert_eq!(value["y"].as_array().unwrap().len(), 129);
        assert_eq!(value["params"]["ny"], 128);
    }

    #[test]
    fn unwritable_mesh_path_is_an_error() {
        let grid = GridParams {
            nx_total: 2,
            nz_total: 2,
            dx: 0.1,
            dz: 0.2,
            ny: 2,
            ny_total: 3,
            a: 1.6,
            ymin: -1.0,
            ymax: 1.0,
        };
        let mesh = build_mesh(&grid).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("mesh.json");
        assert!(write_mesh_json(&mesh, &path).is_err());
    }
}
