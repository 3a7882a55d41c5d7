use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "skyresolve")]
#[command(about = "skyresolve - resolve astronomical objects across CDS, NED and the MPC")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  skyresolve search M31                      Resolve a name
  skyresolve search \"10.68 +41.27\"           Objects near a position
  skyresolve search \"2024 AB\"                Minor planet by designation
  skyresolve cone 05:34:31.9 +22:00:52 -r 0.2 Cone search
  skyresolve resolve Sirius                  Best single match

\x1b[1;36mMore Info:\x1b[0m
  skyresolve status                          Check which services answer
  skyresolve patterns                        Show recognised query formats
  skyresolve <command> --help                Get help for any command")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Verbose output (-v for debug logs from the resolver, -vv for everything)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a name, designator or coordinate pair
    ///
    /// The query is classified first: coordinates go to a SIMBAD cone search,
    /// minor-body designators to the MPC, everything else to Sesame and
    /// SIMBAD with VizieR and NED as supplements.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  skyresolve search M31
  skyresolve search \"NGC 224\" -s simbad,ned
  skyresolve search Ceres --limit 3 --output json
  skyresolve search \"05h34m31.9s +22d00m52s\" --radius 0.05")]
    Search {
        /// Object name, minor-body designator, or \"RA Dec\"
        query: String,
        /// Comma-separated list of sources (sesame, simbad, vizier, ned, mpc)
        #[arg(short = 's', long = "sources")]
        sources: Option<String>,
        /// Maximum number of consolidated results
        #[arg(short, long)]
        limit: Option<usize>,
        /// Per-call timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Cone radius in degrees for coordinate queries
        #[arg(short, long)]
        radius: Option<f64>,
    },

    /// Cone search around an explicit position
    ///
    /// RA and Dec accept decimal degrees or sexagesimal (hh:mm:ss, dd:mm:ss).
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  skyresolve cone 10.6847 41.2689
  skyresolve cone 05:34:31.9 +22:00:52 --radius 0.2
  skyresolve cone 101.287 -16.716 --limit 5")]
    Cone {
        /// Right ascension
        ra: String,
        /// Declination
        #[arg(allow_hyphen_values = true)]
        dec: String,
        /// Radius in degrees
        #[arg(short, long)]
        radius: Option<f64>,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Best single match from MPC, Sesame and SIMBAD
    Resolve {
        /// Object name or designator
        name: String,
    },

    /// Probe every upstream service
    Status,

    /// Show the query formats the classifier recognises
    Patterns,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write a configuration file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}
