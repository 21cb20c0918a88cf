use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::signal::fuse::FusionWeights;

/// Which sentiment scoring backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackend {
    /// Rule-based lexicon scoring (default) — pure, fast, no model files
    Lexicon,
    /// Local ONNX transformer (binary SST-2 classifier) — heavier, opt-in
    Transformer,
}

impl SentimentBackend {
    /// Parse the backend name from configuration. Any value other than
    /// the two supported names is rejected before processing begins.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "lexicon" => Ok(SentimentBackend::Lexicon),
            "transformer" => Ok(SentimentBackend::Transformer),
            other => anyhow::bail!(
                "Unsupported sentiment backend {other:?}. \
                 Set TIDEMARK_SENTIMENT to \"lexicon\" or \"transformer\"."
            ),
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// knob has a default, so a bare `tidemark run` works out of the box.
pub struct Config {
    /// TF-IDF vocabulary cap (TIDEMARK_MAX_FEATURES, default 2000)
    pub max_features: usize,
    /// Target latent dimensions for the SVD reduction
    /// (TIDEMARK_SVD_COMPONENTS, default 50)
    pub svd_components: usize,
    /// Which sentiment scorer to use (TIDEMARK_SENTIMENT, default lexicon)
    pub sentiment_backend: SentimentBackend,
    /// Fusion weights for lexical/sentiment/engagement
    /// (TIDEMARK_WEIGHTS, default "0.4,0.5,0.1")
    pub weights: FusionWeights,
    /// Directory containing the ONNX sentiment model files
    pub model_dir: PathBuf,
    /// Where generated and analyzed batches are written
    pub output_dir: PathBuf,
    /// Seed for the synthetic record generator (TIDEMARK_SEED, default 42)
    pub sample_seed: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let max_features = parse_env("TIDEMARK_MAX_FEATURES", 2000)?;
        let svd_components = parse_env("TIDEMARK_SVD_COMPONENTS", 50)?;
        let sample_seed = parse_env("TIDEMARK_SEED", 42)?;

        let sentiment_backend = match env::var("TIDEMARK_SENTIMENT") {
            Ok(name) => SentimentBackend::parse(&name)?,
            Err(_) => SentimentBackend::Lexicon,
        };

        let weights = match env::var("TIDEMARK_WEIGHTS") {
            Ok(spec) => FusionWeights::parse(&spec)
                .with_context(|| format!("Invalid TIDEMARK_WEIGHTS {spec:?}"))?,
            Err(_) => FusionWeights::default(),
        };

        let model_dir = env::var("TIDEMARK_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::sentiment::download::default_model_dir());

        let output_dir = env::var("TIDEMARK_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./tidemark_output"));

        Ok(Self {
            max_features,
            svd_components,
            sentiment_backend,
            weights,
            model_dir,
            output_dir,
            sample_seed,
        })
    }

    /// Validate that the chosen sentiment backend has what it needs.
    /// For the transformer: model files must exist (or user should run
    /// download-model). The lexicon backend is always available.
    pub fn require_sentiment_backend(&self) -> Result<()> {
        match self.sentiment_backend {
            SentimentBackend::Lexicon => Ok(()),
            SentimentBackend::Transformer => {
                if !crate::sentiment::download::model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX sentiment model files not found in {}\n\
                         Run `tidemark download-model` to download them.\n\
                         Or set TIDEMARK_SENTIMENT=lexicon to use the lexicon scorer instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
        }
    }
}

/// Read an integer-like env var, falling back to `default` when unset.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("Invalid {name}: {value:?}")),
        Err(_) => Ok(default),
    }
}
