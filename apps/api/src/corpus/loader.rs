//! Corpus ingestion: turns raw listing records into validated `JobListing`s.
//!
//! Malformed rows are skipped and reported, never fatal on their own. Deciding what to
//! do when nothing survives is left to the caller (`CorpusStore` escalates `EmptyCorpus`).

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::listing::{JobListing, RawListing, RecordRejection};
use crate::skills::extractor::SkillExtractor;

/// A record that was left out of the corpus, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// 1-based position in the source (data rows only).
    pub row: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Output of one ingestion pass.
#[derive(Debug, Default)]
pub struct Ingested {
    pub listings: Vec<JobListing>,
    pub skipped: Vec<SkippedRecord>,
}

/// Validates already-deserialised records. Later duplicates of an id are skipped.
pub fn ingest_records(records: Vec<RawListing>, extractor: &SkillExtractor) -> Ingested {
    ingest(
        records.into_iter().map(Ok).enumerate().map(|(i, r)| (i + 1, r)),
        extractor,
    )
}

/// Reads CSV with a header row. Unparseable rows are skipped like invalid ones.
pub fn ingest_csv<R: Read>(source: R, extractor: &SkillExtractor) -> Ingested {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let rows: Vec<(usize, Result<RawListing, RecordRejection>)> = reader
        .deserialize::<RawListing>()
        .enumerate()
        .map(|(i, row)| {
            (
                i + 1,
                row.map_err(|e| RecordRejection::Malformed(e.to_string())),
            )
        })
        .collect();

    ingest(rows.into_iter(), extractor)
}

/// Reads a JSON array of listing objects.
pub fn ingest_json<R: Read>(source: R, extractor: &SkillExtractor) -> Result<Ingested> {
    let records: Vec<serde_json::Value> =
        serde_json::from_reader(source).context("Corpus JSON must be an array of objects")?;
    Ok(ingest_values(records, extractor))
}

/// Validates JSON objects one by one, so a badly typed field only costs its own row.
pub fn ingest_values(records: Vec<serde_json::Value>, extractor: &SkillExtractor) -> Ingested {
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(i, value)| (i + 1, RawListing::from_json_value(value)));
    ingest(rows, extractor)
}

/// Loads a corpus file, choosing the format from its extension (`.json`, otherwise CSV).
pub fn load_path(path: &Path, extractor: &SkillExtractor) -> Result<Ingested> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open job corpus at {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let ingested = if is_json {
        ingest_json(file, extractor)?
    } else {
        ingest_csv(file, extractor)
    };

    info!(
        "Read {} listings from {} ({} skipped)",
        ingested.listings.len(),
        path.display(),
        ingested.skipped.len()
    );
    Ok(ingested)
}

fn ingest<I>(rows: I, extractor: &SkillExtractor) -> Ingested
where
    I: Iterator<Item = (usize, Result<RawListing, RecordRejection>)>,
{
    let mut ingested = Ingested::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (row, record) in rows {
        let raw_id = record
            .as_ref()
            .ok()
            .and_then(|r| r.id.as_ref())
            .map(|id| id.trim().to_string());

        let outcome = record.and_then(|raw| JobListing::from_raw(raw, extractor)).and_then(
            |listing| {
                if seen_ids.insert(listing.id.clone()) {
                    Ok(listing)
                } else {
                    Err(RecordRejection::DuplicateId(listing.id))
                }
            },
        );

        match outcome {
            Ok(listing) => ingested.listings.push(listing),
            Err(reason) => {
                warn!("Skipping listing row {row}: {reason}");
                ingested.skipped.push(SkippedRecord {
                    row,
                    id: raw_id,
                    reason: reason.to_string(),
                });
            }
        }
    }

    ingested
}
