use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "REFINE++ CLI - Monte Carlo refinement of protein conformations in torsion space.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Append logs to a file (at INFO or more verbose) in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by parallel runs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refine a structure with repeated Monte Carlo trials and write one decoy per run.
    Refine(RefineArgs),
    /// Score a structure and print the per-term breakdown.
    Score(ScoreArgs),
}

/// Arguments for the `refine` subcommand.
#[derive(Args, Debug)]
pub struct RefineArgs {
    // --- Core Arguments ---
    /// Path to the input structure: a backbone PDB (.pdb/.ent) or a TOML conformation.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Prefix for run labels and output files.
    #[arg(short = 'o', long = "output-prefix", value_name = "PREFIX")]
    pub output_prefix: Option<String>,

    /// Directory that receives decoys and the score file.
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Sampling Overrides ---
    /// Override the Metropolis temperature (kT).
    #[arg(long = "kt", value_name = "FLOAT", allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Override the number of small moves per trial.
    #[arg(long, value_name = "INT")]
    pub small_moves: Option<usize>,

    /// Override the number of shear moves per trial.
    #[arg(long, value_name = "INT")]
    pub shear_moves: Option<usize>,

    /// Override the maximum perturbation width in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub angle_max: Option<f64>,

    // --- Protocol Overrides ---
    /// Override the number of trials per run.
    #[arg(long, value_name = "INT")]
    pub cycles: Option<usize>,

    /// Override the number of independent runs.
    #[arg(short = 'n', long, value_name = "INT")]
    pub runs: Option<usize>,

    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// What to do with a rejected trial: 'revert' or 'drift'.
    #[arg(long, value_name = "POLICY")]
    pub rejection: Option<String>,

    /// Run the independent runs concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Disable the minimization step, overriding the config file.
    #[arg(long)]
    pub no_minimize: bool,

    /// Disable the rotamer packing step, overriding the config file.
    #[arg(long)]
    pub no_pack: bool,

    /// Disable per-trial observation, overriding the config file.
    #[arg(long)]
    pub no_observe: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S protocol.cycles=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Path to the structure to score (.pdb/.ent or TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a configuration file whose `[weights]` table is used.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
