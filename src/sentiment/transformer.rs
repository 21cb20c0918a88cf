// Local ONNX transformer sentiment scorer.
//
// Runs a binary positive/negative classifier (a DistilBERT SST-2
// fine-tune, quantized) entirely on the local CPU — no API calls, no rate
// limits. The two output logits are softmaxed and mapped to a signed
// polarity: +p(positive) when the positive class wins, -p(negative)
// otherwise, so the result lands on the same [-1, 1] scale as the
// lexicon scorer.
//
// Model: Xenova/distilbert-base-uncased-finetuned-sst-2-english (~67MB)

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::SentimentScorer;

/// Output class order for SST-2: index 0 = negative, index 1 = positive.
const NUM_CLASSES: usize = 2;

/// Inputs are truncated to this many characters before tokenization.
/// Long posts carry their polarity early; this bounds inference cost.
const MAX_INPUT_CHARS: usize = 512;

/// Local ONNX-based sentiment scorer. Holds the model session and
/// tokenizer behind Arc<Mutex> so inference can be offloaded to
/// spawn_blocking without blocking the async runtime.
pub struct TransformerScorer {
    // Arc+Mutex because ort::Session::run takes &mut self, spawn_blocking
    // requires 'static, and the SentimentScorer trait needs Send+Sync.
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl std::fmt::Debug for TransformerScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerScorer").finish_non_exhaustive()
    }
}

impl TransformerScorer {
    /// Load the ONNX model and tokenizer from the given directory.
    ///
    /// Expects `model_quantized.onnx` and `tokenizer.json` to exist in
    /// `model_dir`. Call `download::download_model()` first if they don't.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model_quantized.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            anyhow::bail!(
                "Model file not found: {}\nRun `tidemark download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nRun `tidemark download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        debug!("Loaded ONNX sentiment model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentimentScorer for TransformerScorer {
    async fn score_text(&self, text: &str) -> Result<f64> {
        let mut results = self.score_batch(&[text.to_string()]).await?;
        Ok(results.remove(0))
    }

    /// True batch inference: truncate and tokenize all texts, run one
    /// forward pass, softmax the two logits per row, and map each to a
    /// signed polarity.
    ///
    /// The CPU-bound tokenization and inference are offloaded to
    /// spawn_blocking so they don't block the tokio async runtime.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<f64>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Clone Arc handles for the spawn_blocking closure ('static requirement)
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let encodings: Vec<_> = texts
                .iter()
                .map(|t| {
                    tokenizer
                        .encode(truncate_input(t).as_str(), true)
                        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
                })
                .collect::<Result<Vec<_>>>()?;

            let batch_size = encodings.len();
            let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

            // Build flat input tensors with right-padding to max_len.
            // Shape: [batch_size, max_len]
            let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
            let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

            for enc in &encodings {
                let ids = enc.get_ids();
                let mask = enc.get_attention_mask();
                let seq_len = ids.len();

                for &id in ids {
                    input_ids_flat.push(id as i64);
                }
                for &m in mask {
                    attention_mask_flat.push(m as i64);
                }

                // Pad to max_len (pad_id = 0 for DistilBERT WordPiece)
                for _ in seq_len..max_len {
                    input_ids_flat.push(0);
                    attention_mask_flat.push(0);
                }
            }

            let shape = [batch_size as i64, max_len as i64];

            let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
                .context("Failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat))
                .context("Failed to create attention_mask tensor")?;

            let logits_data = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = session
                    .run(ort::inputs! {
                        "input_ids" => input_ids_tensor,
                        "attention_mask" => attention_mask_tensor
                    })
                    .context("ONNX inference failed")?;

                // Output shape: [batch_size, 2] — raw logits (pre-softmax)
                let (_out_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;

                data.to_vec()
            };

            let mut results = Vec::with_capacity(batch_size);
            for (i, text) in texts.iter().enumerate() {
                let offset = i * NUM_CLASSES;
                let (p_negative, p_positive) =
                    softmax2(logits_data[offset] as f64, logits_data[offset + 1] as f64);
                let score = signed_score(p_negative, p_positive);

                debug!(
                    score,
                    p_positive,
                    text_preview = %crate::output::truncate_chars(text, 50),
                    "Transformer scored text"
                );

                results.push(score);
            }

            Ok(results)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Truncate text to the bounded inference length, respecting UTF-8
/// character boundaries.
fn truncate_input(text: &str) -> String {
    text.chars().take(MAX_INPUT_CHARS).collect()
}

/// Two-class softmax: maps a (negative, positive) logit pair to
/// probabilities summing to 1.
fn softmax2(neg_logit: f64, pos_logit: f64) -> (f64, f64) {
    // Subtract the max for numerical stability
    let m = neg_logit.max(pos_logit);
    let e_neg = (neg_logit - m).exp();
    let e_pos = (pos_logit - m).exp();
    let total = e_neg + e_pos;
    (e_neg / total, e_pos / total)
}

/// Map class probabilities to a signed polarity: the winning class's
/// probability, negated when the winner is the negative class.
fn signed_score(p_negative: f64, p_positive: f64) -> f64 {
    if p_positive >= p_negative {
        p_positive
    } else {
        -p_negative
    }
}
