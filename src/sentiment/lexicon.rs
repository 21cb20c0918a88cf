// Rule-based lexicon sentiment scorer.
//
// Computes a compound polarity in [-1, 1] from a fixed valence lexicon
// with three contextual rules: negation within a three-token window flips
// a term's valence, booster words amplify or dampen it (decaying with
// distance), and trailing exclamation marks add emphasis. The compound is
// the rule-adjusted valence sum squashed through x / sqrt(x^2 + alpha).
//
// The lexicon mixes general sentiment terms with market vocabulary
// (bullish, selloff, breakout, ...) since the records are finance chatter.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use super::traits::SentimentScorer;

/// Valence entries on a -4..4 scale, squashed to [-1, 1] at the end.
const LEXICON: &[(&str, f64)] = &[
    // General positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("wonderful", 2.7),
    ("love", 3.2),
    ("happy", 2.7),
    ("best", 3.2),
    ("win", 2.8),
    ("winning", 2.4),
    ("confident", 2.2),
    ("optimistic", 2.2),
    ("upbeat", 2.1),
    ("positive", 2.3),
    // Market positive
    ("bullish", 2.4),
    ("bull", 1.4),
    ("breakout", 1.8),
    ("rally", 2.0),
    ("surge", 2.1),
    ("soar", 2.3),
    ("soaring", 2.3),
    ("gain", 2.4),
    ("gains", 2.4),
    ("profit", 2.2),
    ("profits", 2.2),
    ("growth", 2.4),
    ("strong", 2.3),
    ("recovery", 1.9),
    ("boom", 2.0),
    ("opportunity", 1.8),
    ("momentum", 1.4),
    ("support", 1.2),
    // General negative
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("hate", -2.7),
    ("worst", -3.1),
    ("poor", -2.1),
    ("sad", -2.1),
    ("angry", -2.3),
    ("negative", -2.3),
    ("fraud", -3.0),
    ("scam", -3.2),
    // Market negative
    ("bearish", -2.3),
    ("bear", -1.2),
    ("crash", -2.6),
    ("fear", -2.2),
    ("fears", -2.2),
    ("panic", -2.6),
    ("selloff", -2.1),
    ("plunge", -2.4),
    ("plunging", -2.4),
    ("drop", -1.6),
    ("decline", -1.7),
    ("weak", -1.9),
    ("loss", -2.2),
    ("losses", -2.2),
    ("risky", -1.6),
    ("bubble", -1.3),
    ("warning", -1.4),
    ("crisis", -2.5),
    ("volatile", -1.2),
    ("uncertainty", -1.5),
    ("downturn", -2.0),
    ("recession", -2.4),
    ("dump", -1.8),
    ("bleak", -2.1),
    ("doom", -2.8),
    ("gloom", -2.2),
];

/// Words that amplify (+) or dampen (-) the valence of the term they
/// precede.
const BOOSTERS: &[(&str, f64)] = &[
    ("very", 0.293),
    ("extremely", 0.293),
    ("absolutely", 0.293),
    ("really", 0.293),
    ("incredibly", 0.293),
    ("highly", 0.293),
    ("super", 0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
    ("barely", -0.293),
    ("marginally", -0.293),
];

/// Words that flip the valence of a following term.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "nothing", "cannot", "cant", "wont", "dont", "didnt",
    "doesnt", "isnt", "wasnt", "arent", "aint", "without", "hardly", "rarely", "seldom",
];

/// Negation flips and dampens rather than mirroring exactly —
/// "not good" is negative but weaker than "bad".
const NEGATION_FACTOR: f64 = -0.74;

/// Booster effect decays with distance from the scored term.
const BOOST_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

/// Each trailing '!' adds emphasis, capped at four marks.
const EXCLAMATION_BOOST: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

/// Squashing constant for the compound normalization.
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Lexicon-based sentiment scorer — the default backend.
///
/// Pure function of its input: no model files, no network, no state.
#[derive(Debug)]
pub struct LexiconScorer {
    words: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            words: LEXICON.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
        }
    }
}

impl LexiconScorer {
    /// Score one text. Returns the compound polarity in [-1, 1];
    /// text with no lexicon hits scores exactly 0.
    pub fn score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        let mut sum = 0.0;
        let mut hits = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(token.as_str()) else {
                continue;
            };
            hits += 1;
            let mut valence = base;

            // Look back up to three tokens for boosters and negations
            let mut negated = false;
            for dist in 1..=3usize {
                let Some(prev) = i.checked_sub(dist).map(|j| tokens[j].as_str()) else {
                    break;
                };
                if let Some(&boost) = self.boosters.get(prev) {
                    valence += valence.signum() * boost * BOOST_DECAY[dist - 1];
                }
                if NEGATIONS.contains(&prev) {
                    negated = true;
                }
            }
            if negated {
                valence *= NEGATION_FACTOR;
            }

            sum += valence;
        }

        if hits == 0 {
            return 0.0;
        }

        // Punctuation emphasis: trailing exclamation marks push the sum
        // further in its own direction
        let exclamations = text.chars().filter(|&c| c == '!').count();
        let emphasis = exclamations.min(MAX_EXCLAMATIONS) as f64 * EXCLAMATION_BOOST;
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }

        normalize_compound(sum)
    }
}

/// Squash an unbounded valence sum into [-1, 1].
fn normalize_compound(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    async fn score_text(&self, text: &str) -> Result<f64> {
        Ok(self.score(text))
    }
}
