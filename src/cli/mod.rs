use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use lipidconv::job::SplitMode;
use lipidconv::merge::MergeStrategy;
use lipidconv::preset::ConverterPreset;

mod config;
mod convert;
mod levels;
mod merge;
mod probe;
mod summary;

/// lipidconv - Multi-level raw to mzXML conversion for lipidomics
#[derive(Parser)]
#[command(name = "lipidconv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Converter family.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum PresetArg {
    /// Function-indexed converter, split by level index
    #[default]
    WatersFunctions,
    /// Filter-driven converter, split by msLevel filter
    Msconvert,
}

impl From<PresetArg> for ConverterPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::WatersFunctions => ConverterPreset::WatersFunctions,
            PresetArg::Msconvert => ConverterPreset::MsConvert,
        }
    }
}

/// Level split mode.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SplitArg {
    /// Single pass, no level discovery
    None,
    /// Rewrite output path and level index per level
    A,
    /// Convert each level into its own directory with an msLevel filter
    B,
    /// Variant A followed by variant B
    Both,
}

impl From<SplitArg> for SplitMode {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::None => SplitMode::None,
            SplitArg::A => SplitMode::VariantA,
            SplitArg::B => SplitMode::VariantB,
            SplitArg::Both => SplitMode::Both,
        }
    }
}

/// Level merge strategy.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// Scan-level mzXML merge
    Mzxml,
    /// Byte concatenation
    Concatenate,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Mzxml => MergeStrategy::MzXml,
            StrategyArg::Concatenate => MergeStrategy::Concatenate,
        }
    }
}

/// Arguments of the convert command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source acquisition (file or vendor directory)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output mzXML path (defaults to the source with the intermediate extension)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Converter preset (defaults to the job file, then waters-functions)
    #[arg(short = 'p', long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Converter executable (defaults to the preset's program)
    #[arg(long, value_name = "EXE")]
    pub program: Option<String>,

    /// Level split mode (defaults to the preset's mode)
    #[arg(short = 's', long, value_enum)]
    pub split: Option<SplitArg>,

    /// Load settings and job options from a TOML job file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the _FUN*.DAT level markers
    #[arg(long, value_name = "DIR")]
    pub marker_dir: Option<PathBuf>,

    /// Keep the per-level files instead of merging them
    #[arg(long)]
    pub no_merge: bool,

    /// Leave the trailing level out of the merge
    #[arg(long)]
    pub skip_last: bool,

    /// Ignore converter exit codes and trust the produced files
    #[arg(long)]
    pub trust_files: bool,

    /// Merge strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Probe the result for polarity switching
    #[arg(long)]
    pub probe: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an acquisition, splitting and merging its MS levels
    Convert(ConvertArgs),

    /// Count the MS level markers of an acquisition
    Levels {
        /// Acquisition directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Merge existing level files (<BASE>, <BASE>2, ...) into <BASE>_merged
    Merge {
        /// Level-1 file
        #[arg(value_name = "BASE")]
        base: PathBuf,

        /// Number of levels
        #[arg(value_name = "LEVELS")]
        levels: usize,

        /// Leave the trailing level out of the merge
        #[arg(long)]
        skip_last: bool,

        /// Merge strategy
        #[arg(long, value_enum, default_value = "mzxml")]
        strategy: StrategyArg,
    },

    /// Report whether an mzXML file switches polarity
    Probe {
        /// mzXML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
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
        Commands::Convert(args) => convert::run(args),
        Commands::Levels { dir } => levels::run(dir),
        Commands::Merge {
            base,
            levels,
            skip_last,
            strategy,
        } => merge::run(base, levels, skip_last, MergeStrategy::from(strategy)),
        Commands::Probe { file } => probe::run(file),
    }
}
