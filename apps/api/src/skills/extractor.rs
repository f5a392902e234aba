//! Skill Extractor: turns raw resume text into a `UserProfile`.
//!
//! Algorithm:
//! 1. Normalise the text into tokens (see `skills::normalize`)
//! 2. Walk the token stream; at each position try the vocabulary aliases that start with
//!    the current token, longest first. A match consumes its tokens, so "machine learning"
//!    wins over "machine" and the shorter alias never fires inside it.
//! 3. Collect distinct canonical names (presence only, no weighting)
//! 4. Estimate years of experience with `skills::experience::estimate_years`
//!
//! Cost is linear in the token count times the number of aliases sharing a leading token.
//! Extraction never fails: empty or junk input yields an empty profile.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::models::profile::UserProfile;
use crate::skills::experience::estimate_years;
use crate::skills::normalize::{normalize_phrase, tokenize};
use crate::skills::vocabulary::SkillVocabulary;

#[derive(Debug, Clone)]
pub struct SkillExtractor {
    vocabulary: Arc<SkillVocabulary>,
}

impl SkillExtractor {
    pub fn new(vocabulary: Arc<SkillVocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Extracts a profile, resolving "present" date ranges against today's date.
    pub fn extract(&self, raw_text: &str) -> UserProfile {
        self.extract_as_of(raw_text, Utc::now().date_naive())
    }

    /// Extracts a profile with an explicit reference date for open-ended ranges.
    pub fn extract_as_of(&self, raw_text: &str, today: NaiveDate) -> UserProfile {
        let skills = self.find_skills(raw_text);
        let experience_years = estimate_years(raw_text, today);
        debug!(
            "Extracted {} skills, {:.1} years of experience",
            skills.len(),
            experience_years
        );
        UserProfile::new(skills, experience_years)
    }

    /// Builds a profile from skills a caller declared directly.
    ///
    /// Names the vocabulary knows collapse to their canonical form; unknown names are kept
    /// in normalised form since the corpus may still mention them.
    pub fn profile_from_declared<S: AsRef<str>>(
        &self,
        skills: &[S],
        experience_years: f32,
    ) -> UserProfile {
        let skills = skills
            .iter()
            .filter_map(|raw| match self.vocabulary.match_token(raw.as_ref()) {
                Some(entry) => Some(entry.name.clone()),
                None => Some(normalize_phrase(raw.as_ref())).filter(|s| !s.is_empty()),
            })
            .collect();
        UserProfile::new(skills, experience_years)
    }

    /// Distinct canonical skill names mentioned in the text.
    pub fn find_skills(&self, text: &str) -> BTreeSet<String> {
        let tokens = tokenize(text);
        let mut found = BTreeSet::new();

        let mut i = 0;
        while i < tokens.len() {
            let matched = self
                .vocabulary
                .patterns_starting_with(&tokens[i])
                .iter()
                .find(|p| tokens[i..].starts_with(&p.tokens));

            match matched {
                Some(pattern) => {
                    found.insert(self.vocabulary.entry(pattern.entry).name.clone());
                    i += pattern.tokens.len();
                }
                None => i += 1,
            }
        }

        found
    }
}
