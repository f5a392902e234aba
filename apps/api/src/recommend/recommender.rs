//! Recommender: ranks a corpus snapshot against a `UserProfile`.
//!
//! Algorithm:
//! 1. Query vector = profile skill names projected through the corpus idf table
//!    (unseen terms weigh nothing), L2-normalised
//! 2. Cosine similarity = dot product with each stored listing vector
//! 3. Blend with experience fit (`recommend::experience_fit`)
//! 4. Sort by final score descending, ties broken by listing id ascending
//! 5. Keep the first `top_n`
//!
//! Scoring is read-only over the snapshot and runs across listings in parallel.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::corpus::index::CorpusIndex;
use crate::corpus::store::CorpusStore;
use crate::errors::MatchError;
use crate::models::listing::JobListing;
use crate::models::profile::UserProfile;
use crate::recommend::experience_fit::{blend, experience_fit, DEFAULT_ALPHA};

const MAX_MATCHED_SKILLS: usize = 5;
const MAX_MISSING_SKILLS: usize = 3;

/// A listing with its score and the reasons behind it.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: JobListing,
    /// Final score in [0, 1].
    pub score: f32,
    /// Cosine similarity in [0, 1] before the experience blend.
    pub similarity: f32,
    pub experience_fit: Option<f32>,
    /// Number of listing skills the profile covers.
    pub skill_overlap: usize,
    /// Covered skills, alphabetical, at most five.
    pub matched_skills: Vec<String>,
    /// Listing skills the profile lacks, alphabetical, at most three.
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Ok,
    /// No corpus has been loaded yet; results are empty.
    EmptyCorpus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSet {
    pub status: RecommendationStatus,
    /// Generation of the snapshot that was scored, when there was one.
    pub generation: Option<u64>,
    pub results: Vec<ScoredListing>,
}

#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    alpha: f32,
}

impl Default for Recommender {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Recommender {
    /// `alpha` weighs skill similarity against experience fit; 1.0 disables the latter.
    pub fn new(alpha: f32) -> Result<Self, MatchError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(MatchError::InvalidArgument(format!(
                "alpha must be within [0, 1], got {alpha}"
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn experience_adjustment_enabled(&self) -> bool {
        self.alpha < 1.0
    }

    /// Ranks every listing in `index` and returns the best `top_n`.
    pub fn recommend(
        &self,
        profile: &UserProfile,
        index: &CorpusIndex,
        top_n: usize,
    ) -> Result<Vec<ScoredListing>, MatchError> {
        check_top_n(top_n)?;

        let query = index.query_vector(profile.skills.iter().map(String::as_str));

        let mut ranked: Vec<(usize, f32, f32, Option<f32>)> = index
            .vectors()
            .par_iter()
            .zip(index.listings().par_iter())
            .enumerate()
            .map(|(position, (vector, listing))| {
                let similarity = query.dot(vector).clamp(0.0, 1.0);
                let fit = if self.experience_adjustment_enabled() && profile.has_experience() {
                    experience_fit(profile.experience_years, listing.required_experience)
                } else {
                    None
                };
                let score = blend(similarity, fit, self.alpha);
                (position, score, similarity, fit)
            })
            .collect();

        let listings = index.listings();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| listings[a.0].id.cmp(&listings[b.0].id))
        });
        ranked.truncate(top_n);

        debug!(
            "Scored {} listings for {} skills, returning {}",
            listings.len(),
            profile.skills.len(),
            ranked.len()
        );

        Ok(ranked
            .into_iter()
            .map(|(position, score, similarity, experience_fit)| {
                let listing = &listings[position];
                let matched: Vec<String> = listing
                    .required_skills
                    .intersection(&profile.skills)
                    .cloned()
                    .collect();
                let missing_skills = listing
                    .required_skills
                    .difference(&profile.skills)
                    .take(MAX_MISSING_SKILLS)
                    .cloned()
                    .collect();
                ScoredListing {
                    listing: listing.clone(),
                    score,
                    similarity,
                    experience_fit,
                    skill_overlap: matched.len(),
                    matched_skills: matched.into_iter().take(MAX_MATCHED_SKILLS).collect(),
                    missing_skills,
                }
            })
            .collect())
    }

    /// Ranks against whatever snapshot `store` currently publishes.
    ///
    /// With no corpus loaded this is not an error: the set comes back empty and flagged.
    pub fn recommend_from_store(
        &self,
        profile: &UserProfile,
        store: &CorpusStore,
        top_n: usize,
    ) -> Result<RecommendationSet, MatchError> {
        check_top_n(top_n)?;

        let Some(snapshot) = store.snapshot() else {
            return Ok(RecommendationSet {
                status: RecommendationStatus::EmptyCorpus,
                generation: None,
                results: Vec::new(),
            });
        };

        let results = self.recommend(profile, &snapshot.index, top_n)?;
        Ok(RecommendationSet {
            status: RecommendationStatus::Ok,
            generation: Some(snapshot.generation),
            results,
        })
    }
}

/// Validates a caller-supplied `top_n`; zero and negatives are contract violations.
pub fn validate_top_n(top_n: i64) -> Result<usize, MatchError> {
    if top_n <= 0 {
        return Err(MatchError::InvalidArgument(format!(
            "top_n must be a positive integer, got {top_n}"
        )));
    }
    usize::try_from(top_n)
        .map_err(|_| MatchError::InvalidArgument(format!("top_n {top_n} is too large")))
}

fn check_top_n(top_n: usize) -> Result<(), MatchError> {
    if top_n == 0 {
        return Err(MatchError::InvalidArgument(
            "top_n must be a positive integer, got 0".to_string(),
        ));
    }
    Ok(())
}
