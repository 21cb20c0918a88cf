// Seeded synthetic record generator.
//
// Produces finance-chatter records for a hashtag without touching the
// network. The generator is deterministic for a given (hashtag, n, seed)
// triple, which keeps the whole pipeline reproducible end to end.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::dataset::Record;

/// Message templates. `{h}` is the hashtag, `{sent}` the sentiment word,
/// `{dir}` the expected direction.
const PATTERNS: [&str; 4] = [
    "Strong move in #{h}, looks {sent}. traders expect {dir}.",
    "#{h} showing {sent} momentum, watch levels. price likely {dir}.",
    "Short term {h} {sent}. intraday traders {dir} today.",
    "Market chatter about #{h}: {sent}. volume rising.",
];

const SENTIMENTS: [&str; 3] = ["bullish", "bearish", "neutral"];

/// Generate `n` sample records for one hashtag.
///
/// Each hashtag reseeds its own generator, so batches for different
/// hashtag lists still produce identical records per hashtag.
pub fn sample_records_for(hashtag: &str, n: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = Utc::now();

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let sent = SENTIMENTS[rng.random_range(0..SENTIMENTS.len())];
        let dir = match sent {
            "bullish" => "up",
            "bearish" => "down",
            _ => {
                if rng.random_range(0..2) == 0 {
                    "up"
                } else {
                    "down"
                }
            }
        };

        let pattern = PATTERNS[rng.random_range(0..PATTERNS.len())];
        let content = pattern
            .replace("{h}", hashtag)
            .replace("{sent}", sent)
            .replace("{dir}", dir);

        out.push(Record {
            username: format!("user_{hashtag}_{i}"),
            timestamp: now,
            content,
            likes: rng.random_range(0..=500),
            retweets: rng.random_range(0..=200),
            replies: rng.random_range(0..=50),
            hashtags: vec![hashtag.to_string()],
            mentions: vec![],
        });
    }

    info!(count = out.len(), hashtag, "Generated sample records");
    out
}

/// Generate sample records for a list of hashtags, concatenated in
/// hashtag order.
pub fn sample_records(hashtags: &[String], per_hashtag: usize, seed: u64) -> Vec<Record> {
    let mut all = Vec::with_capacity(hashtags.len() * per_hashtag);
    for hashtag in hashtags {
        all.extend(sample_records_for(hashtag, per_hashtag, seed));
    }
    all
}
