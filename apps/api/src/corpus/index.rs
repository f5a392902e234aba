#![allow(dead_code)]

//! Corpus Index: immutable TF-IDF snapshot of a job corpus.
//!
//! Each listing's title + description is one document. Term weights are
//! `tf(term, doc) × idf(term)` with the smoothed inverse document frequency
//!
//! ```text
//! idf(term) = ln((1 + N) / (1 + df(term))) + 1
//! ```
//!
//! so no term gets zero weight and nothing divides by zero. Document vectors are
//! L2-normalised when stored, which makes cosine similarity a plain dot product.
//!
//! A corpus change never edits an existing index: build a new one and swap it in
//! through `CorpusStore`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::corpus::vector::SparseVector;
use crate::errors::MatchError;
use crate::models::listing::JobListing;
use crate::skills::normalize::tokenize;

#[derive(Debug)]
pub struct CorpusIndex {
    listings: Vec<JobListing>,
    /// term → term id
    terms: HashMap<String, usize>,
    /// term id → document frequency
    doc_freq: Vec<u32>,
    /// term id → idf
    idf: Vec<f32>,
    /// listing position → normalised tf-idf vector
    vectors: Vec<SparseVector>,
    built_at: DateTime<Utc>,
}

/// Summary of an index, for status endpoints and logs.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub listings: usize,
    pub terms: usize,
    pub built_at: DateTime<Utc>,
}

impl CorpusIndex {
    /// Builds an index over `listings`. Fails with `EmptyCorpus` when there are none.
    pub fn build(listings: Vec<JobListing>) -> Result<Self, MatchError> {
        if listings.is_empty() {
            return Err(MatchError::EmptyCorpus);
        }

        let mut terms: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<u32> = Vec::new();

        // Raw term counts per document, keyed by term id.
        let counts: Vec<HashMap<usize, u32>> = listings
            .iter()
            .map(|listing| {
                let mut tf: HashMap<usize, u32> = HashMap::new();
                for token in tokenize(&listing.document_text()) {
                    let next_id = terms.len();
                    let id = *terms.entry(token).or_insert(next_id);
                    if id == doc_freq.len() {
                        doc_freq.push(0);
                    }
                    *tf.entry(id).or_insert(0) += 1;
                }
                for &id in tf.keys() {
                    doc_freq[id] += 1;
                }
                tf
            })
            .collect();

        let n = listings.len() as f32;
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let vectors = counts
            .into_iter()
            .map(|tf| {
                let pairs = tf
                    .into_iter()
                    .map(|(id, count)| (id, count as f32 * idf[id]))
                    .collect();
                SparseVector::from_pairs(pairs).normalized()
            })
            .collect();

        info!(
            "Built corpus index: {} listings, {} terms",
            listings.len(),
            terms.len()
        );

        Ok(Self {
            listings,
            terms,
            doc_freq,
            idf,
            vectors,
            built_at: Utc::now(),
        })
    }

    /// Produces a fresh index for `new_listings`. `self` is left untouched.
    pub fn rebuild(&self, new_listings: Vec<JobListing>) -> Result<Self, MatchError> {
        Self::build(new_listings)
    }

    /// Projects free-text terms into this index's vector space.
    ///
    /// Terms the corpus never used get zero weight. The result is L2-normalised;
    /// no known terms gives the zero vector.
    pub fn query_vector<'a, I>(&self, texts: I) -> SparseVector
    where
        I: IntoIterator<Item = &'a str>,
    {
        let pairs = texts
            .into_iter()
            .flat_map(tokenize)
            .filter_map(|token| self.terms.get(&token).map(|&id| (id, self.idf[id])))
            .collect();
        SparseVector::from_pairs(pairs).normalized()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.terms.get(term).map(|&id| self.idf[id])
    }

    pub fn document_frequency(&self, term: &str) -> u32 {
        self.terms.get(term).map(|&id| self.doc_freq[id]).unwrap_or(0)
    }

    pub fn listings(&self) -> &[JobListing] {
        &self.listings
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            listings: self.listings.len(),
            terms: self.terms.len(),
            built_at: self.built_at,
        }
    }
}
