use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use tidemark::config;
use tidemark::dataset;
use tidemark::ingest;
use tidemark::output;
use tidemark::sentiment;
use tidemark::signal::{EngineConfig, SignalEngine};

/// Tidemark: composite signal analysis for social market chatter.
///
/// Turns a batch of short market-chatter records into one ranked signal
/// per record by fusing lexical importance, sentiment polarity, and
/// engagement popularity.
#[derive(Parser)]
#[command(name = "tidemark", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic record batch and write it as JSON-lines
    Generate {
        /// Comma-separated hashtags to generate chatter for
        #[arg(long, default_value = "nifty50,sensex,intraday,banknifty")]
        hashtags: String,

        /// Records to generate per hashtag (default: 500)
        #[arg(long, default_value = "500")]
        per_hashtag: usize,
    },

    /// Analyze a stored record batch and write the scored result
    Analyze {
        /// Path to a JSON-lines record batch
        input: PathBuf,

        /// How many top records to show in the report (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Run the whole pipeline: generate, clean, analyze, report
    Run {
        /// Comma-separated hashtags to generate chatter for
        #[arg(long, default_value = "nifty50,sensex,intraday,banknifty")]
        hashtags: String,

        /// Records to generate per hashtag (default: 500)
        #[arg(long, default_value = "500")]
        per_hashtag: usize,

        /// How many top records to show in the report (default: 20)
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Download the ONNX sentiment model (~67 MB)
    DownloadModel,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tidemark=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            hashtags,
            per_hashtag,
        } => {
            let config = config::Config::load()?;
            let tags = split_hashtags(&hashtags);

            println!("Generating {per_hashtag} records per hashtag for {tags:?}...");
            let records = ingest::sample::sample_records(&tags, per_hashtag, config.sample_seed);
            let cleaned = ingest::clean::clean_records(records);

            let path = batch_path(&config.output_dir, "records");
            dataset::io::write_jsonl(&path, &cleaned)?;
            println!(
                "Wrote {} cleaned records to {}",
                cleaned.len(),
                path.display()
            );
            println!(
                "{}",
                format!("Next: tidemark analyze {}", path.display()).dimmed()
            );
        }

        Commands::Analyze { input, top } => {
            let config = config::Config::load()?;
            config.require_sentiment_backend()?;

            let records = dataset::io::read_jsonl(&input)?;
            println!("Analyzing {} records...", records.len());

            let engine = SignalEngine::new(EngineConfig::from(&config));
            let scored = engine.analyze(&records).await?;

            let scored_path = batch_path(&config.output_dir, "signals");
            dataset::io::write_jsonl(&scored_path, &scored)?;

            let sample_path = sample_csv_path(&config.output_dir);
            dataset::io::write_csv_sample(&sample_path, &scored, 2000)?;

            output::terminal::display_signal_report(&scored, top);
            println!("Scored batch written to {}", scored_path.display());
        }

        Commands::Run {
            hashtags,
            per_hashtag,
            top,
        } => {
            let config = config::Config::load()?;
            config.require_sentiment_backend()?;
            let tags = split_hashtags(&hashtags);

            info!(?tags, per_hashtag, "Starting pipeline");
            println!("Generating {per_hashtag} records per hashtag for {tags:?}...");
            let records = ingest::sample::sample_records(&tags, per_hashtag, config.sample_seed);
            let cleaned = ingest::clean::clean_records(records);
            if cleaned.is_empty() {
                println!("No records after cleaning. Nothing to analyze.");
                return Ok(());
            }

            let records_path = batch_path(&config.output_dir, "records");
            dataset::io::write_jsonl(&records_path, &cleaned)?;

            println!("Analyzing {} records...", cleaned.len());
            let engine = SignalEngine::new(EngineConfig::from(&config));
            let scored = engine.analyze(&cleaned).await?;

            let scored_path = batch_path(&config.output_dir, "signals");
            dataset::io::write_jsonl(&scored_path, &scored)?;

            let sample_path = sample_csv_path(&config.output_dir);
            dataset::io::write_csv_sample(&sample_path, &scored, 2000)?;

            output::terminal::display_signal_report(&scored, top);
            println!(
                "{}",
                format!("Pipeline complete. Outputs in {}", config.output_dir.display()).bold()
            );
        }

        Commands::DownloadModel => {
            let config = config::Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX sentiment model...");
            println!("  Destination: {}", model_dir.display());

            sentiment::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("Set TIDEMARK_SENTIMENT=transformer to use it.");
        }
    }

    Ok(())
}

/// Split a comma-separated hashtag list, dropping empty entries.
fn split_hashtags(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Timestamped JSONL path under the output data directory.
fn batch_path(output_dir: &std::path::Path, stem: &str) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M");
    output_dir.join("data").join(format!("{stem}_{timestamp}.jsonl"))
}

/// Timestamped CSV sample path under the output sample directory.
fn sample_csv_path(output_dir: &std::path::Path) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M");
    output_dir
        .join("sample_output")
        .join(format!("signals_sample_{timestamp}.csv"))
}
