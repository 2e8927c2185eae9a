//! # platescreen
//!
//! Command-line front end of the plate screening pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Check a workbook
//! platescreen validate --input workbook/
//!
//! # Run the pipeline
//! platescreen -v process --input workbook/ --readouts readouts/ \
//!     --mp-ast mp_ast.txt --ast-acd ast_acd.txt --output results/
//!
//! # 384-well position of B3 in quadrant 2
//! platescreen map-position B3 2
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
