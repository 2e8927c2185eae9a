use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use platescreen::geometry::PlateFormat;

mod map_position;
mod precipitation;
mod process;
mod template;
mod validate;

mod config;

/// platescreen - Microtiter plate screening pipeline
#[derive(Parser)]
#[command(name = "platescreen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Plate format of generated tables.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum FormatArg {
    /// 96-well plate (8 × 12)
    #[value(name = "96")]
    Wells96,
    /// 384-well plate (16 × 24)
    #[default]
    #[value(name = "384")]
    Wells384,
}

impl From<FormatArg> for PlateFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Wells96 => PlateFormat::Wells96,
            FormatArg::Wells384 => PlateFormat::Wells384,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write result tables
    Process {
        /// Workbook directory (Substances, Organisms, Dilutions, Controls sheets)
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// Directory of plate-reader exports
        #[arg(short, long, value_name = "DIR")]
        readouts: PathBuf,

        /// Mother plate → assay transfer plate mapping file
        #[arg(long, value_name = "FILE")]
        mp_ast: PathBuf,

        /// Assay transfer plate → assay detection plate mapping file
        #[arg(long, value_name = "FILE")]
        ast_acd: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Load pipeline settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Substances column identifying each tested entity
        #[arg(long, value_name = "COLUMN")]
        substance_id: Option<String>,

        /// Relative-activity cutoff in percent (repeatable)
        #[arg(short, long = "threshold", value_name = "PCT")]
        thresholds: Vec<f64>,
    },

    /// Check a workbook before running the pipeline
    Validate {
        /// Workbook directory
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// Substances column identifying each tested entity
        #[arg(long, value_name = "COLUMN", default_value = "Internal ID")]
        substance_id: String,
    },

    /// Map a 96-well position and quadrant to its 384-well position
    MapPosition {
        /// 96-well position, e.g. A1
        #[arg(value_name = "POSITION")]
        position: String,

        /// Quadrant (1-4)
        #[arg(value_name = "QUADRANT")]
        quadrant: u8,
    },

    /// Flag precipitated wells from a batch of reader exports
    Precipitation {
        /// Directory of plate-reader exports
        #[arg(short, long, value_name = "DIR")]
        readouts: PathBuf,

        /// Output CSV (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Raw measurement label used for the value column
        #[arg(long, value_name = "LABEL", default_value = "Raw Optical Density")]
        measurement: String,
    },

    /// Generate an input table template
    Template {
        /// Take plate barcodes from the reader exports in this directory
        #[arg(short, long, value_name = "DIR")]
        readouts: Option<PathBuf>,

        /// Plate format
        #[arg(short, long, default_value = "384", value_enum)]
        format: FormatArg,

        /// Output CSV
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process {
            input,
            readouts,
            mp_ast,
            ast_acd,
            output,
            config,
            substance_id,
            thresholds,
        } => process::run(
            input,
            readouts,
            mp_ast,
            ast_acd,
            output,
            config,
            substance_id,
            thresholds,
        ),
        Commands::Validate {
            input,
            substance_id,
        } => validate::run(input, substance_id),
        Commands::MapPosition { position, quadrant } => map_position::run(&position, quadrant),
        Commands::Precipitation {
            readouts,
            output,
            measurement,
        } => precipitation::run(readouts, output, measurement),
        Commands::Template {
            readouts,
            format,
            output,
        } => template::run(readouts, PlateFormat::from(format), output),
    }
}
