//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for geotools
#[derive(Parser, Debug)]
#[command(name = "geotools")]
#[command(author, version, about = "Run geoprocessing tools on single datasets or in batch")]
#[command(long_about = r#"
geotools runs registered geoprocessing tools. Each tool declares typed
parameters; values are validated before the tool runs.

Without --input a tool runs once. With one or more --input paths (or
--input-glob) the tool runs once per input, binding each input to the batch
parameter and naming outputs <input>_<output>.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./geotools.toml       Project-level config
3. ~/.config/geotools/config.toml   Global config

Example:
  geotools list
  geotools describe buffer --batch
  geotools run buffer -p InputLayer=parcels.geojson -p BufferDistance=25
  geotools run buffer --input-glob 'data/*.geojson' -p BufferDistance=25 --report batch.jsonl
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered tools grouped by category
    List {
        /// Only tools of this group (e.g. vector-geometry)
        #[arg(long, value_name = "KEY")]
        group: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a tool's parameters
    Describe {
        /// Tool id
        tool: String,

        /// Describe the controls used in batch mode
        #[arg(long)]
        batch: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a tool once, or once per input in batch mode
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Tool id
    pub tool: String,

    /// Parameter assignment `Name=Value` (can be specified multiple times)
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Batch input (can be specified multiple times)
    #[arg(short, long, value_name = "PATH")]
    pub input: Vec<String>,

    /// Glob pattern of batch inputs
    #[arg(long, value_name = "PATTERN")]
    pub input_glob: Option<String>,

    /// Parameter that varies across batch items (defaults to the first layer parameter)
    #[arg(long, value_name = "NAME")]
    pub batch_param: Option<String>,

    /// Halt the batch at the first failed item
    #[arg(long)]
    pub stop_on_error: bool,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Keep outputs in memory when the tool supports it
    #[arg(long)]
    pub in_memory: bool,

    /// Directory for output files
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Append results to this JSONL report
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Batch mode is selected by any batch input source.
    pub fn is_batch(&self) -> bool {
        !self.input.is_empty() || self.input_glob.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_single() {
        let cli = Cli::parse_from([
            "geotools",
            "run",
            "buffer",
            "-p",
            "InputLayer=parcels.geojson",
            "--param",
            "BufferDistance=25",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.tool, "buffer");
        assert_eq!(args.params.len(), 2);
        assert!(!args.is_batch());
    }

    #[test]
    fn test_parse_run_batch() {
        let cli = Cli::parse_from([
            "geotools",
            "run",
            "buffer",
            "--input",
            "a.geojson",
            "--input",
            "b.geojson",
            "--stop-on-error",
            "--report",
            "batch.jsonl",
        ]);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.is_batch());
        assert!(args.stop_on_error);
        assert_eq!(args.report, Some(PathBuf::from("batch.jsonl")));
    }

    #[test]
    fn test_parse_describe_and_list() {
        let cli = Cli::parse_from(["geotools", "describe", "buffer", "--batch"]);
        assert!(matches!(cli.command, Some(Command::Describe { batch: true, .. })));

        let cli = Cli::parse_from(["geotools", "list", "--group", "raster"]);
        assert!(matches!(cli.command, Some(Command::List { group: Some(_), .. })));

        let cli = Cli::parse_from(["geotools", "--show-config"]);
        assert!(cli.show_config && cli.command.is_none());
    }
}
