use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "belt",
    author,
    version,
    about = "Design belt balancers by mixed-integer programming",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, solve and print a balancer
    Solve(SolveArgs),
    /// Build a balancer model and print or export it without solving
    Model(ModelArgs),
    /// Write or inspect configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with every default filled in
    Init {
        /// Destination file
        #[arg(default_value = "belt.toml", value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration after applying flags to `--config`
    Show(BalancerArgs),
}

/// Layout and big-M options shared by every command. Flags override values
/// from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct BalancerArgs {
    /// TOML file with `[balancer]` and `[solver]` sections
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Number of inbound belts (one cargo type each)
    #[arg(short = 'i', long)]
    pub inbound: Option<usize>,

    /// Number of outbound belts
    #[arg(short = 'o', long)]
    pub outbound: Option<usize>,

    /// Number of splitters the design may use
    #[arg(short = 's', long)]
    pub splitters: Option<usize>,

    /// Upper bound on per-cargo route traffic
    #[arg(long)]
    pub u_t: Option<f64>,

    /// Upper bound on per-cargo splitter inflow
    #[arg(long)]
    pub u_x: Option<f64>,
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    #[command(flatten)]
    pub balancer: BalancerArgs,

    /// MIP solver (microlp, or highs when built with solver-highs)
    #[arg(long)]
    pub solver: Option<String>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the result to this file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    /// Re-check the solved assignment against every constraint
    #[arg(long)]
    pub verify: bool,

    /// Absolute tolerance for --verify
    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    #[command(flatten)]
    pub balancer: BalancerArgs,

    /// Print every variable and constraint instead of the summary
    #[arg(long)]
    pub full: bool,

    /// Write the model in CPLEX LP format to this path
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub lp: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Connection listing
    Text,
    /// Aligned table with per-cargo mix
    Table,
    /// Pretty JSON
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
