use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dataset::{LoadOptions, DEFAULT_SUBSAMPLE};
use crate::figure::DEFAULT_POINT_SIZE;
use crate::io::ReportFormat;
use crate::ordination::DEFAULT_DEPTH;
use crate::view::DEFAULT_NEIGHBORS;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find the American Gut participants whose gut phyla look most like yours"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Path to log file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare one Bacteroidetes/Firmicutes composition against the population
    Query(QueryCommand),

    /// Read compositions from stdin and answer each with one JSON line
    Explore(ExploreCommand),

    /// Show the average composition of healthy participants
    Healthy(HealthyCommand),

    /// Compute the Bray-Curtis PCoA coordinates from genus counts
    Ordinate(OrdinateCommand),
}

#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// PCoA coordinates (CSV: sample id, PC1, PC2)
    #[arg(long, default_value = "ag_pcoa.csv")]
    pub ordination: PathBuf,

    /// Genus-level counts (long-format CSV with id, Phylum, count)
    #[arg(long, default_value = "ag_genus.csv")]
    pub genera: PathBuf,

    /// Participant metadata (TSV indexed on sample_name)
    #[arg(long, default_value = "ag_metadata.tsv")]
    pub metadata: PathBuf,

    /// Number of participants drawn from the ordination
    #[arg(long, default_value_t = DEFAULT_SUBSAMPLE)]
    pub subsample: usize,

    /// Seed for the participant draw (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Number of nearest participants to report
    #[arg(short = 'n', long, default_value_t = DEFAULT_NEIGHBORS)]
    pub neighbors: usize,

    /// Base marker size for the figure (2-30)
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE)]
    pub point_size: f64,

    /// Year ages are computed against (defaults to the current year)
    #[arg(long)]
    pub reference_year: Option<i32>,

    /// Include the scatter plot data
    #[arg(long)]
    pub include_figure: bool,
}

#[derive(Parser, Debug)]
pub struct QueryCommand {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Bacteroidetes abundance in percent (0-100)
    #[arg(short, long)]
    pub bacteroidetes: f64,

    /// Firmicutes abundance in percent (0-100)
    #[arg(short, long)]
    pub firmicutes: f64,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ExploreCommand {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Parser, Debug)]
pub struct HealthyCommand {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OrdinateCommand {
    /// Genus-level counts (long-format CSV with id, Genus, count)
    #[arg(long)]
    pub genera: PathBuf,

    /// Reads kept per sample; shallower samples are dropped
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: u64,

    /// Output CSV
    #[arg(short, long)]
    pub output: PathBuf,

    /// Seed for rarefaction (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
            OutputFormat::Tsv => Self::Tsv,
        }
    }
}

impl From<&DatasetArgs> for LoadOptions {
    fn from(args: &DatasetArgs) -> Self {
        LoadOptions {
            ordination: args.ordination.clone(),
            genera: args.genera.clone(),
            metadata: args.metadata.clone(),
            subsample: args.subsample,
            seed: args.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_defaults() {
        let cli = Cli::parse_from(["gut-neighbors", "query", "-b", "40", "-f", "35"]);
        let Commands::Query(cmd) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(cmd.bacteroidetes, 40.0);
        assert_eq!(cmd.view.neighbors, DEFAULT_NEIGHBORS);
        assert_eq!(cmd.view.point_size, DEFAULT_POINT_SIZE);
        assert_eq!(cmd.dataset.subsample, DEFAULT_SUBSAMPLE);
        assert!(cmd.dataset.seed.is_none());
        assert!(matches!(ReportFormat::from(cmd.format), ReportFormat::Text));
    }

    #[test]
    fn test_negative_neighbors_rejected() {
        assert!(Cli::try_parse_from([
            "gut-neighbors", "query", "-b", "40", "-f", "35", "-n", "-1"
        ])
        .is_err());
    }

    #[test]
    fn test_format_conversion() {
        assert!(matches!(OutputFormat::Tsv.into(), ReportFormat::Tsv));
    }
}
