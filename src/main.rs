mod artifact;
mod config;
mod dates;
mod error;
mod merge;
mod normalize;
mod notifier;
mod record;
mod sources;
mod viewer;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::PipelineConfig;
use crate::viewer::ViewFilter;

#[derive(Parser)]
#[command(name = "auction-aggregator")]
#[command(about = "Normalizes and merges bank auction notices into a daily combined dataset")]
struct Args {
    /// Directory holding per-source exports and combined artifacts
    #[arg(long, default_value = "auction_exports")]
    export_dir: PathBuf,

    /// Run date as YYYY-MM-DD (default: today)
    #[arg(long)]
    run_date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the latest per-source exports into one combined artifact
    Combine,

    /// Display the latest combined artifact, optionally filtered
    View {
        /// Keep only records with this source tag
        #[arg(long)]
        source: Option<String>,

        /// Keep only records with at least this many days remaining
        #[arg(long)]
        min_days: Option<i64>,

        /// Keep only records with at most this many days remaining
        #[arg(long)]
        max_days: Option<i64>,

        /// Write the filtered rows to this CSV file instead of printing
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Email a digest of auctions closing within the threshold
    Notify {
        /// Inclusive upper bound on days until submission
        #[arg(long, default_value_t = 7)]
        days_threshold: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = PipelineConfig::new(args.export_dir.clone(), args.run_date);

    match args.command.unwrap_or(Command::Combine) {
        Command::Combine => {
            let (path, rows) = merge::combine(&config)?;
            println!("{} ({} rows)", path.display(), rows);
        }
        Command::View {
            source,
            min_days,
            max_days,
            output,
        } => {
            let path = artifact::latest_artifact(&config.export_dir)?;
            info!("Displaying data from {}", path.display());
            let rows = artifact::load_artifact(&path)?;
            let filter = ViewFilter {
                source,
                min_days,
                max_days,
            };
            let filtered = viewer::filter_rows(&rows, &filter);
            match output {
                Some(out) => {
                    fs::write(&out, artifact::rows_to_csv(&filtered)?)?;
                    println!("Saved {} row(s) to {}", filtered.len(), out.display());
                }
                None => {
                    print!("{}", viewer::render_table(&filtered));
                    println!(
                        "{} of {} row(s), sources: {}",
                        filtered.len(),
                        rows.len(),
                        viewer::source_tags(&rows).join(", ")
                    );
                }
            }
        }
        Command::Notify { days_threshold } => {
            let notifier_config = notifier::NotifierConfig::from_env(days_threshold)?;
            let path = artifact::latest_artifact(&config.export_dir)?;
            let rows = artifact::load_artifact(&path)?;
            notifier::send_digest(&notifier_config, &rows, config.run_date).await?;
        }
    }

    Ok(())
}
