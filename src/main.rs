//! # lipidconv
//!
//! Command-line driver for the multi-level raw to mzXML conversion pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a Waters acquisition, splitting and merging its functions
//! lipidconv convert run01.raw out/run01.mzXML
//!
//! # Use msconvert with msLevel filters and keep the level files
//! lipidconv convert run01.raw --preset msconvert --split b --no-merge
//!
//! # Drive the job from a TOML job file
//! lipidconv convert run01.raw --config run01.toml --json
//!
//! # Inspect and merge by hand
//! lipidconv levels run01.raw
//! lipidconv merge out/run01.mzXML 3 --skip-last
//! lipidconv probe out/run01.mzXML
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
