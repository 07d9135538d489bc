//! ptmnet Ingest - enzyme-substrate aggregation tool

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ptmnet_common::logging::{init_logging, LogConfig, LogLevel};
use ptmnet_common::taxonomy;
use ptmnet_ingest::{EnzymeSubstrateAggregator, IngestConfig, Services};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ptmnet-ingest")]
#[command(author, version, about = "Enzyme-substrate interaction aggregation tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the aggregate and write a snapshot
    Build {
        #[command(flatten)]
        build: BuildArgs,

        /// Snapshot file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export the enzyme-substrate table
    Export {
        #[command(flatten)]
        build: BuildArgs,

        /// Output TSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Add the ncbi_tax_id column
        #[arg(long)]
        tax_id: bool,
    },

    /// Per-resource statistics
    Summary {
        #[command(flatten)]
        build: BuildArgs,

        /// Output TSV file, JSON on stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Overrides of the `PTMNET_*` environment configuration
#[derive(Args, Debug)]
struct BuildArgs {
    /// Data directory; proteomes, mapping and orthology are read from its subdirectories
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Target organism, taxonomy id or name
    #[arg(long)]
    organism: Option<String>,

    /// Source organisms for homology translation
    #[arg(long, value_delimiter = ',')]
    homology_from: Vec<String>,

    /// Resources to include
    #[arg(short, long, value_delimiter = ',')]
    resources: Vec<String>,

    /// Translate sites by curated homology only
    #[arg(long)]
    strict_homology: bool,

    /// Snapshot to restore instead of processing the resources
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

impl BuildArgs {
    fn apply(&self, mut config: IngestConfig) -> Result<IngestConfig> {
        if let Some(dir) = &self.data_dir {
            config.proteome_dir = dir.join("proteomes");
            config.mapping_dir = dir.join("mapping");
            config.orthology_dir = dir.join("orthology");
            config.data_dir = dir.clone();
        }
        if let Some(organism) = &self.organism {
            config.ncbi_tax_id = taxonomy::ensure_ncbi_tax_id(organism)?;
        }
        if !self.homology_from.is_empty() {
            config.homology_from = self
                .homology_from
                .iter()
                .map(|organism| taxonomy::ensure_ncbi_tax_id(organism))
                .collect::<Result<_, _>>()?;
        }
        if !self.resources.is_empty() {
            config.resources = self.resources.clone();
        }
        if self.strict_homology {
            config.ptm_homology_strict = true;
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot_file = Some(snapshot.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

fn build(args: &BuildArgs, snapshot_output: Option<PathBuf>) -> Result<(EnzymeSubstrateAggregator, Services)> {
    let config = args.apply(IngestConfig::load()?)?;
    let services = Services::from_config(&config)?;

    let mut options = config.to_aggregator_options().show_progress(true);
    if let Some(path) = snapshot_output {
        options = options.snapshot_file(path, true).restore_snapshot(false);
    } else {
        options.save_snapshot = false;
    }

    let mut aggregator = EnzymeSubstrateAggregator::new(options);
    aggregator.build(&services).context("Failed to build the aggregate")?;
    Ok((aggregator, services))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("ptmnet-ingest")
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env()?;

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Build { build: args, output } => {
            info!("Building enzyme-substrate aggregate");
            let (aggregator, _) = build(&args, Some(output.clone()))?;
            info!(
                snapshot = %output.display(),
                interactions = aggregator.len(),
                resources = aggregator.resources().len(),
                "Aggregate built"
            );
        },
        Command::Export {
            build: args,
            output,
            tax_id,
        } => {
            info!("Exporting enzyme-substrate table");
            let (aggregator, services) = build(&args, None)?;
            aggregator.export_table(&output, services.mapper.as_ref(), tax_id)?;
        },
        Command::Summary { build: args, output } => {
            info!("Summarizing resources");
            let (mut aggregator, _) = build(&args, None)?;
            aggregator.update_summaries();
            match output {
                Some(path) => aggregator.export_summaries(&path)?,
                None => println!("{}", serde_json::to_string_pretty(aggregator.summaries())?),
            }
        },
    }

    info!("Done");
    Ok(())
}
