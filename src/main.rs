use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use skillmatch::config::Config;
use skillmatch::pipeline::query;

/// skillmatch: group job postings by required skills.
///
/// Trains a TF-IDF + k-means model on scraped postings and finds the postings
/// that match a skill profile you care about.
#[derive(Parser)]
#[command(name = "skillmatch", version, about)]
struct Cli {
    /// Artifact prefix (overrides SKILLMATCH_PREFIX)
    #[arg(long, global = true)]
    prefix: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the skill model from a CSV of scraped postings
    Train {
        /// Postings file (default: SKILLMATCH_INPUT or daily_jobs.csv)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of clusters (default: SKILLMATCH_CLUSTERS or 5)
        #[arg(long)]
        clusters: Option<usize>,

        /// Seed for centroid initialization (default: SKILLMATCH_SEED or 42)
        #[arg(long)]
        seed: Option<u64>,

        /// Pages fetched in parallel (default: SKILLMATCH_WORKERS or 5)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Find postings matching a comma-separated skill list
    Query {
        /// Skills, e.g. "Python, SQL, Machine Learning"
        skills: String,

        /// Also write the matches to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the postings in one cluster
    Browse {
        cluster: usize,

        /// Also write the postings to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show cluster sizes and their top skills
    Describe {
        /// Skills to show per cluster (default: 8)
        #[arg(long, default_value = "8")]
        top: usize,
    },

    /// Show model and table status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skillmatch=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(prefix) = cli.prefix {
        config.artifact_prefix = prefix;
    }

    match cli.command {
        Commands::Train {
            input,
            clusters,
            seed,
            workers,
        } => {
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(k) = clusters {
                config.cluster_count = k;
            }
            if let Some(seed) = seed {
                config.random_seed = seed;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }

            info!(input = %config.input_path.display(), "Starting training run");
            println!(
                "Training on postings from {}...",
                config.input_path.display()
            );

            let source = skillmatch::ingest::CsvJobSource::new(&config.input_path);
            let summary = skillmatch::pipeline::train::run(&source, &config).await?;
            skillmatch::output::terminal::display_train_summary(&summary);
        }

        Commands::Query { skills, output } => {
            let (artifact, rows) = load_or_exit(&config);
            let outcome = query::run(&artifact, &rows, &skills);
            skillmatch::output::terminal::display_query(&outcome);

            if let Some(path) = output {
                skillmatch::postings::table::save(&path, &outcome.matches)?;
                println!("{}", format!("Matches saved to: {}", path.display()).bold());
            }
        }

        Commands::Browse { cluster, output } => {
            let (artifact, rows) = load_or_exit(&config);
            let postings = query::browse(&artifact, &rows, cluster)?;

            println!(
                "\n{}",
                format!("=== Cluster {cluster}: {} posting(s) ===", postings.len()).bold()
            );
            if postings.is_empty() {
                println!("  No postings in this cluster.");
            } else {
                skillmatch::output::terminal::display_postings(&postings);
            }

            if let Some(path) = output {
                skillmatch::postings::table::save(&path, &postings)?;
                println!("{}", format!("Postings saved to: {}", path.display()).bold());
            }
        }

        Commands::Describe { top } => {
            let (artifact, rows) = load_or_exit(&config);
            let summaries = query::describe(&artifact, &rows, top);
            skillmatch::output::terminal::display_clusters(&summaries);
        }

        Commands::Status => {
            skillmatch::status::show(&config)?;
        }
    }

    Ok(())
}

/// Load the artifact and labeled table, or tell the user the resources are
/// unavailable and exit. Never falls back to retraining.
fn load_or_exit(
    config: &Config,
) -> (
    skillmatch::artifact::TrainedArtifact,
    Vec<skillmatch::postings::LabeledPosting>,
) {
    match query::load_labeled(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            if query::is_resources_unavailable(&e) {
                eprintln!("{} {e:#}", "Resources unavailable:".red().bold());
                eprintln!("Run `skillmatch train` to build the model and posting table.");
            } else {
                eprintln!("{} {e:#}", "Error:".red().bold());
            }
            std::process::exit(1);
        }
    }
}
