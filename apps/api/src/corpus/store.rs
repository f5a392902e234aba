#![allow(dead_code)]

//! Corpus Store: process-wide holder of the current `CorpusIndex` snapshot.
//!
//! Readers clone an `Arc` out of the store and score against it without holding any
//! lock. A rebuild constructs the replacement index first and only then takes the
//! write lock for a pointer swap, so requests see either the old snapshot or the new
//! one, never a partial build. A failed rebuild leaves the old snapshot serving.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

use crate::corpus::index::{CorpusIndex, CorpusStats};
use crate::corpus::loader::{ingest_records, ingest_values, Ingested, SkippedRecord};
use crate::errors::MatchError;
use crate::models::listing::{JobListing, RawListing};
use crate::skills::extractor::SkillExtractor;

/// A published index together with its generation number (1 for the first install).
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    pub index: Arc<CorpusIndex>,
    pub generation: u64,
}

/// Outcome of a successful rebuild from raw records.
#[derive(Debug, Clone, Serialize)]
pub struct RebuildReport {
    pub generation: u64,
    pub indexed: usize,
    pub terms: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Status view of the store.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStatus {
    pub generation: u64,
    #[serde(flatten)]
    pub stats: Option<CorpusStats>,
}

#[derive(Debug, Default)]
pub struct CorpusStore {
    current: RwLock<Option<CorpusSnapshot>>,
}

impl CorpusStore {
    /// A store with no corpus yet ("no jobs" is a valid transient state).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_index(index: CorpusIndex) -> Self {
        let store = Self::empty();
        store.install(index);
        store
    }

    /// The snapshot requests should score against, if any.
    pub fn snapshot(&self) -> Option<CorpusSnapshot> {
        self.current.read().clone()
    }

    /// Publishes a fully built index and returns its generation.
    pub fn install(&self, index: CorpusIndex) -> u64 {
        let index = Arc::new(index);
        let mut current = self.current.write();
        let generation = current.as_ref().map_or(0, |s| s.generation) + 1;
        *current = Some(CorpusSnapshot { index, generation });
        drop(current);

        info!("Installed corpus snapshot generation {generation}");
        generation
    }

    /// Builds a new index off to the side, then swaps it in.
    pub fn rebuild(&self, listings: Vec<JobListing>) -> Result<u64, MatchError> {
        let index = CorpusIndex::build(listings)?;
        Ok(self.install(index))
    }

    /// Validates raw records, skipping malformed ones, and rebuilds from the rest.
    /// Escalates `EmptyCorpus` only when no record survives.
    pub fn rebuild_from_records(
        &self,
        records: Vec<RawListing>,
        extractor: &SkillExtractor,
    ) -> Result<RebuildReport, MatchError> {
        self.rebuild_from_ingested(ingest_records(records, extractor))
    }

    /// Same as `rebuild_from_records`, but decodes each JSON object separately first.
    pub fn rebuild_from_json(
        &self,
        records: Vec<serde_json::Value>,
        extractor: &SkillExtractor,
    ) -> Result<RebuildReport, MatchError> {
        self.rebuild_from_ingested(ingest_values(records, extractor))
    }

    fn rebuild_from_ingested(&self, ingested: Ingested) -> Result<RebuildReport, MatchError> {
        let indexed = ingested.listings.len();
        let index = CorpusIndex::build(ingested.listings)?;
        let terms = index.stats().terms;
        let generation = self.install(index);

        Ok(RebuildReport {
            generation,
            indexed,
            terms,
            skipped: ingested.skipped,
        })
    }

    pub fn status(&self) -> CorpusStatus {
        match self.snapshot() {
            Some(snapshot) => CorpusStatus {
                generation: snapshot.generation,
                stats: Some(snapshot.index.stats()),
            },
            None => CorpusStatus {
                generation: 0,
                stats: None,
            },
        }
    }
}
