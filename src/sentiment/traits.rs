// Sentiment scorer trait — the swap-ready abstraction.
//
// This trait defines the interface for polarity scoring. The default
// implementation is the pure lexicon scorer; a local ONNX transformer
// (binary SST-2 classifier) is available as an opt-in backend.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for scoring text polarity. Implementations must be async because
/// the transformer backend offloads CPU-bound inference to a blocking
/// thread; the lexicon backend simply completes immediately.
#[async_trait]
pub trait SentimentScorer: Send + Sync + std::fmt::Debug {
    /// Score a single text. Returns one compound polarity in [-1, 1]:
    /// -1 strongly negative, 0 neutral, +1 strongly positive.
    async fn score_text(&self, text: &str) -> Result<f64>;

    /// Score multiple texts, returning one scalar per input in the same
    /// order. Default implementation calls score_text sequentially —
    /// backends can override for true batch inference.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<f64>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.score_text(text).await?);
        }
        Ok(results)
    }
}
