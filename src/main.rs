mod cli;
mod cohort;
mod dataset;
mod error;
mod figure;
mod io;
mod neighbors;
mod ordination;
mod taxa;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, Write};

use crate::cli::{
    Cli, Commands, ExploreCommand, HealthyCommand, OrdinateCommand, QueryCommand, ViewArgs,
};
use crate::cohort::healthiest;
use crate::dataset::{Dataset, LoadOptions};
use crate::neighbors::QueryPoint;
use crate::view::{current_year, DashboardView, ViewOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(log_file) = cli.log_file {
        let file = File::create(log_file)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    // Set up parallel processing
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize thread pool")?;
    }

    match cli.command {
        Commands::Query(cmd) => handle_query_command(cmd)?,
        Commands::Explore(cmd) => handle_explore_command(cmd)?,
        Commands::Healthy(cmd) => handle_healthy_command(cmd)?,
        Commands::Ordinate(cmd) => handle_ordinate_command(cmd)?,
    }

    Ok(())
}

fn load_dataset(options: &LoadOptions) -> Result<Dataset> {
    info!("Loading American Gut data...");
    let dataset = Dataset::load(options).context("Failed to load the dataset")?;
    info!(
        "Loaded {} participants, {} with metadata records",
        dataset.samples.len(),
        dataset.metadata.len()
    );
    Ok(dataset)
}

fn view_options(args: &ViewArgs) -> ViewOptions {
    ViewOptions {
        neighbors: args.neighbors,
        point_size: args.point_size,
        reference_year: args.reference_year.unwrap_or_else(current_year),
        include_figure: args.include_figure,
    }
}

fn handle_query_command(cmd: QueryCommand) -> Result<()> {
    let query = QueryPoint::from_percentages(cmd.bacteroidetes, cmd.firmicutes)
        .context("Invalid composition")?;
    let dataset = load_dataset(&LoadOptions::from(&cmd.dataset))?;

    let view = DashboardView::compute(&dataset, &view_options(&cmd.view), query)
        .context("Failed to compute the view")?;

    let mut writer = io::open_output(cmd.output.as_deref())?;
    io::write_view(&mut *writer, &view, cmd.format.into())?;
    writer.flush()?;
    Ok(())
}

/// Parse `<bacteroidetes> <firmicutes>` in percent
fn parse_query_line(line: &str) -> Result<QueryPoint> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let &[b, f] = fields.as_slice() else {
        anyhow::bail!("expected two percentages, got {:?}", line);
    };
    let b: f64 = b.parse().with_context(|| format!("invalid Bacteroidetes value {:?}", b))?;
    let f: f64 = f.parse().with_context(|| format!("invalid Firmicutes value {:?}", f))?;
    Ok(QueryPoint::from_percentages(b, f)?)
}

/// Answer one query per input line until end of input or `quit`/`exit`.
/// Lines are decoded lossily so bad bytes produce an error line, not a stop.
fn explore<R: BufRead, W: Write>(
    dataset: &Dataset,
    options: &ViewOptions,
    mut input: R,
    output: &mut W,
) -> Result<usize> {
    let mut answered = 0usize;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let view = parse_query_line(line)
            .and_then(|query| Ok(DashboardView::compute(dataset, options, query)?));
        match view {
            Ok(view) => io::write_json_line(output, &view)?,
            Err(e) => {
                warn!("Rejected query {:?}: {:#}", line, e);
                io::write_error_line(output, &format!("{:#}", e))?;
            }
        }
        answered += 1;
    }
    Ok(answered)
}

fn handle_explore_command(cmd: ExploreCommand) -> Result<()> {
    let dataset = load_dataset(&LoadOptions::from(&cmd.dataset))?;
    let options = view_options(&cmd.view);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let answered = explore(&dataset, &options, stdin.lock(), &mut stdout)?;
    debug!("Answered {} queries", answered);
    Ok(())
}

fn handle_healthy_command(cmd: HealthyCommand) -> Result<()> {
    let dataset = load_dataset(&LoadOptions::from(&cmd.dataset))?;
    let reference = healthiest(&dataset.samples, &dataset.metadata)
        .context("Failed to compute the healthy reference")?;

    let mut writer = io::open_output(cmd.output.as_deref())?;
    io::write_reference(&mut *writer, &reference, cmd.format.into())?;
    writer.flush()?;
    Ok(())
}

fn handle_ordinate_command(cmd: OrdinateCommand) -> Result<()> {
    let records = io::read_genera(&cmd.genera)
        .with_context(|| format!("Failed to read {}", cmd.genera.display()))?;
    let rows = ordination::ordinate(&records, cmd.depth, cmd.seed)
        .context("Failed to compute the ordination")?;

    io::write_ordination(&cmd.output, &rows)
        .with_context(|| format!("Failed to write {}", cmd.output.display()))?;
    info!("Wrote {} coordinates to {}", rows.len(), cmd.output.display());
    Ok(())
}
