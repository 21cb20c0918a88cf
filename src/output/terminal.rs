// Colored terminal output for analyzed batches.
//
// This module handles all terminal-specific formatting: the ranked
// signal table and the batch summary. The main.rs display calls
// delegate here.

use colored::Colorize;

use crate::dataset::ScoredRecord;

/// Display the top `top_n` records by composite signal.
///
/// Sorts a copy — the caller's batch keeps its input order.
pub fn display_signal_report(scored: &[ScoredRecord], top_n: usize) {
    if scored.is_empty() {
        println!("No records analyzed. Run `tidemark run` to build a batch.");
        return;
    }

    let mut ranked: Vec<&ScoredRecord> = scored.iter().collect();
    ranked.sort_by(|a, b| {
        b.composite_signal
            .partial_cmp(&a.composite_signal)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_n);

    println!(
        "\n{}",
        format!(
            "=== Signal Report (top {} of {} records) ===",
            ranked.len(),
            scored.len()
        )
        .bold()
    );
    println!();

    // Header
    println!(
        "  {:>4}  {:<24} {:>9}  {:>9}  {:>6}  {}",
        "Rank".dimmed(),
        "User".dimmed(),
        "Composite".dimmed(),
        "Sentiment".dimmed(),
        "Engmt".dimmed(),
        "Content".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for (i, row) in ranked.iter().enumerate() {
        let preview = super::truncate_chars(&row.record.content, 42);
        println!(
            "  {:>4}. {:<24} {:>9.3}  {:>9}  {:>6.2}  {}",
            i + 1,
            row.record.username,
            row.composite_signal,
            colorize_sentiment(row.sentiment),
            row.engagement,
            preview.dimmed(),
        );
    }

    println!();

    // Summary
    let mean_composite: f64 =
        scored.iter().map(|r| r.composite_signal).sum::<f64>() / scored.len() as f64;
    let upbeat = scored.iter().filter(|r| r.sentiment > 0.5).count();
    let downbeat = scored.iter().filter(|r| r.sentiment < 0.5).count();

    println!("  Mean composite: {mean_composite:.3}");
    println!(
        "  Sentiment split: {} upbeat / {} downbeat",
        upbeat.to_string().green(),
        downbeat.to_string().red(),
    );
}

/// Colorize a normalized sentiment value: green above the batch midpoint,
/// red below, plain at exactly 0.5.
fn colorize_sentiment(value: f64) -> colored::ColoredString {
    let text = format!("{value:.3}");
    if value > 0.5 {
        text.green()
    } else if value < 0.5 {
        text.red()
    } else {
        text.normal()
    }
}
