// Batch cleaning: content normalization and deduplication.
//
// The engine assumes cleaned text (lowercased, URLs stripped), so this is
// the stage that guarantees it. Deduplication keys on cleaned content and
// keeps the first occurrence — relative row order is never disturbed.

use std::collections::HashSet;

use regex_lite::Regex;
use tracing::info;

use crate::dataset::Record;

/// Normalize one piece of content: strip URLs, drop everything outside
/// the basic alphanumeric/#/@ charset, collapse whitespace, lowercase.
pub fn clean_text(text: &str) -> String {
    let url_re = Regex::new(r"https?://\S+").expect("valid regex");
    let without_urls = url_re.replace_all(text, " ");

    let filtered: String = without_urls
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '#' || c == '@' {
                c
            } else {
                ' '
            }
        })
        .collect();

    filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extract `#hashtag` tokens from content.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let re = Regex::new(r"#(\w+)").expect("valid regex");
    re.captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Extract `@mention` tokens from content.
pub fn extract_mentions(content: &str) -> Vec<String> {
    let re = Regex::new(r"@(\w+)").expect("valid regex");
    re.captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Clean a batch: normalize every record's content, backfill hashtags and
/// mentions when the source left them empty, and drop duplicate rows by
/// cleaned content (first occurrence wins).
pub fn clean_records(records: Vec<Record>) -> Vec<Record> {
    let before = records.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        record.content = clean_text(&record.content);
        if record.hashtags.is_empty() {
            record.hashtags = extract_hashtags(&record.content);
        }
        if record.mentions.is_empty() {
            record.mentions = extract_mentions(&record.content);
        }

        if seen.insert(record.content.clone()) {
            out.push(record);
        }
    }

    info!(before, after = out.len(), "Deduplicated records");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(content: &str) -> Record {
        Record {
            username: "user_c".to_string(),
            timestamp: Utc::now(),
            content: content.to_string(),
            likes: 0,
            retweets: 0,
            replies: 0,
            hashtags: vec![],
            mentions: vec![],
        }
    }

    #[test]
    fn clean_text_strips_urls_and_lowercases() {
        let cleaned = clean_text("Check THIS out https://example.com/x?q=1 #Nifty50!");
        assert_eq!(cleaned, "check this out #nifty50");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \t b\n\nc  "), "a b c");
    }

    #[test]
    fn dedup_keeps_first_occurrence_and_order() {
        let batch = vec![
            record("bullish breakout today"),
            record("bearish crash fears"),
            record("Bullish  breakout TODAY"),
        ];
        let cleaned = clean_records(batch);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].content, "bullish breakout today");
        assert_eq!(cleaned[1].content, "bearish crash fears");
    }

    #[test]
    fn hashtags_backfilled_from_content() {
        let cleaned = clean_records(vec![record("watching #sensex and @traderx closely")]);
        assert_eq!(cleaned[0].hashtags, vec!["sensex".to_string()]);
        assert_eq!(cleaned[0].mentions, vec!["traderx".to_string()]);
    }
}
