// Batch persistence — JSON-lines read/write plus a bounded CSV sample.
//
// Batches are stored one JSON object per line so they can be streamed,
// diffed and appended without a reader for some columnar format. The CSV
// export is a convenience sample for spreadsheet users, capped in size.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::records::{Record, ScoredRecord};

/// Write a batch as JSON-lines, creating parent directories as needed.
pub fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for row in rows {
        serde_json::to_writer(&mut writer, row).context("Failed to serialize row")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(rows = rows.len(), path = %path.display(), "Wrote batch");
    Ok(())
}

/// Read a batch of records from a JSON-lines file. Blank lines are
/// skipped; a malformed line aborts with its line number.
pub fn read_jsonl(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("Malformed record at {}:{}", path.display(), i + 1))?;
        records.push(record);
    }

    info!(rows = records.len(), path = %path.display(), "Read batch");
    Ok(records)
}

/// Write the first `limit` scored rows as CSV.
pub fn write_csv_sample(path: &Path, scored: &[ScoredRecord], limit: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "username,timestamp,content,likes,retweets,tfidf_signal,sentiment,engagement,composite_signal"
    )?;

    for row in scored.iter().take(limit) {
        writeln!(
            writer,
            "{},{},{},{},{},{:.6},{:.6},{:.6},{:.6}",
            csv_escape(&row.record.username),
            row.record.timestamp.to_rfc3339(),
            csv_escape(&row.record.content),
            row.record.likes,
            row.record.retweets,
            row.tfidf_signal,
            row.sentiment,
            row.engagement,
            row.composite_signal,
        )?;
    }
    writer.flush()?;

    info!(
        rows = scored.len().min(limit),
        path = %path.display(),
        "Wrote CSV sample"
    );
    Ok(())
}

/// Quote a CSV field if it contains a delimiter, quote or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
