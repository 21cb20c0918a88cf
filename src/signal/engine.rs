// Engine façade — orchestrates the signal pipeline over one batch.
//
// Given a batch of records, this module:
// 1. Validates the fusion weights
// 2. Resolves the configured sentiment backend
// 3. Builds the TF-IDF term matrix
// 4. Reduces it to a dense embedding
// 5. Scores sentiment per record
// 6. Fuses lexical/sentiment/engagement into the composite signal
// 7. Returns the batch with four appended columns, in input order
//
// The engine holds no state across calls: every invocation builds and
// discards its own matrices, and nothing fitted is reused between
// batches. One call, one batch, strictly sequential stages.

use std::path::PathBuf;

use ndarray::Axis;
use tracing::{info, warn};

use crate::config::{Config, SentimentBackend};
use crate::dataset::{Record, ScoredRecord};
use crate::error::AnalysisError;
use crate::sentiment;
use crate::signal::fuse::{self, FusionWeights};
use crate::signal::reduce::TruncatedSvd;
use crate::signal::vectorize::TfidfVectorizer;

/// Everything the engine needs to process one batch.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_features: usize,
    pub svd_components: usize,
    pub sentiment_backend: SentimentBackend,
    pub weights: FusionWeights,
    pub model_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_features: 2000,
            svd_components: 50,
            sentiment_backend: SentimentBackend::Lexicon,
            weights: FusionWeights::default(),
            model_dir: crate::sentiment::download::default_model_dir(),
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_features: config.max_features,
            svd_components: config.svd_components,
            sentiment_backend: config.sentiment_backend,
            weights: config.weights,
            model_dir: config.model_dir.clone(),
        }
    }
}

/// The signal analysis engine.
pub struct SignalEngine {
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Analyze one batch and return it with the four signal columns
    /// appended. Row count and row order are preserved exactly; the
    /// input records are never modified.
    ///
    /// Configuration and dependency problems abort before any column is
    /// produced. An empty batch short-circuits to an empty result
    /// without touching the vectorizer.
    pub async fn analyze(&self, records: &[Record]) -> Result<Vec<ScoredRecord>, AnalysisError> {
        self.config.weights.validate()?;

        if records.is_empty() {
            warn!("Empty batch — skipping analysis");
            return Ok(Vec::new());
        }

        // Backend resolution is the last failure point before processing
        let scorer = sentiment::create_scorer(self.config.sentiment_backend, &self.config.model_dir)?;

        let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();

        // Stage 1: sparse term weights
        let vectorizer = TfidfVectorizer {
            max_features: self.config.max_features,
        };
        let matrix = vectorizer.fit_transform(&texts);
        info!(
            rows = matrix.n_rows(),
            terms = matrix.n_terms(),
            "TF-IDF term matrix built"
        );

        // Stage 2: dense low-rank embedding
        let svd = TruncatedSvd {
            n_components: self.config.svd_components,
            ..TruncatedSvd::default()
        };
        let embedding = svd.fit_transform(&matrix);
        info!(components = embedding.ncols(), "Reduced term matrix");

        // Lexical importance: mean embedding value per row
        let lexical: Vec<f64> = embedding
            .mean_axis(Axis(1))
            .map(|means| means.to_vec())
            .unwrap_or_else(|| vec![0.0; records.len()]);

        // Stage 3: sentiment polarity per record
        let sentiment_scores = scorer
            .score_batch(&texts)
            .await
            .map_err(|e| AnalysisError::Dependency(e.to_string()))?;
        info!(rows = sentiment_scores.len(), "Scored sentiment");

        // Stage 4: engagement and fusion
        let engagement: Vec<f64> = records.iter().map(Record::engagement_raw).collect();

        let fused = fuse::fuse(&lexical, &sentiment_scores, &engagement, &self.config.weights)?;

        let scored: Vec<ScoredRecord> = records
            .iter()
            .enumerate()
            .map(|(i, record)| ScoredRecord {
                record: record.clone(),
                tfidf_signal: fused.lexical[i],
                sentiment: fused.sentiment[i],
                engagement: fused.engagement[i],
                composite_signal: fused.composite[i],
            })
            .collect();

        info!(rows = scored.len(), "Signal analysis complete");
        Ok(scored)
    }
}
