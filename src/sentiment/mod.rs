// Sentiment scoring — one polarity scalar per record, two backends.

pub mod download;
pub mod lexicon;
pub mod traits;
pub mod transformer;

use std::path::Path;

pub use traits::SentimentScorer;

use crate::config::SentimentBackend;
use crate::error::AnalysisError;

/// Resolve the configured backend into a scorer.
///
/// Backend selection happens once per batch, never per record. The
/// transformer backend is a hard dependency: if its model files are
/// missing or fail to load, the batch aborts — it is never silently
/// downgraded to the lexicon scorer.
pub fn create_scorer(
    backend: SentimentBackend,
    model_dir: &Path,
) -> Result<Box<dyn SentimentScorer>, AnalysisError> {
    match backend {
        SentimentBackend::Lexicon => Ok(Box::new(lexicon::LexiconScorer::default())),
        SentimentBackend::Transformer => {
            if !download::model_files_present(model_dir) {
                return Err(AnalysisError::Dependency(format!(
                    "transformer sentiment requested but model files are missing from {}. \
                     Run `tidemark download-model`, or set TIDEMARK_SENTIMENT=lexicon",
                    model_dir.display()
                )));
            }
            let scorer = transformer::TransformerScorer::load(model_dir)
                .map_err(|e| AnalysisError::Dependency(e.to_string()))?;
            Ok(Box::new(scorer))
        }
    }
}
