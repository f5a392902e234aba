use std::collections::BTreeSet;

use serde::Serialize;

/// Structured skill/experience representation of a candidate.
///
/// Skills are canonical vocabulary names, deduplicated and kept sorted so two profiles
/// built from the same text compare equal. `experience_years` is never negative;
/// 0.0 means unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub skills: BTreeSet<String>,
    pub experience_years: f32,
}

impl UserProfile {
    pub fn new(skills: BTreeSet<String>, experience_years: f32) -> Self {
        let experience_years = if experience_years.is_finite() {
            experience_years.max(0.0)
        } else {
            0.0
        };
        Self {
            skills,
            experience_years,
        }
    }

    pub fn empty() -> Self {
        Self::new(BTreeSet::new(), 0.0)
    }

    pub fn has_experience(&self) -> bool {
        self.experience_years > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_experience_clamped() {
        assert_eq!(UserProfile::new(BTreeSet::new(), -3.0).experience_years, 0.0);
    }

    #[test]
    fn test_nan_experience_is_unknown() {
        let profile = UserProfile::new(BTreeSet::new(), f32::NAN);
        assert_eq!(profile.experience_years, 0.0);
        assert!(!profile.has_experience());
    }

    #[test]
    fn test_skills_are_ordered_and_deduplicated() {
        let skills: BTreeSet<String> = ["sql", "python", "sql"].iter().map(|s| s.to_string()).collect();
        let profile = UserProfile::new(skills, 2.0);
        assert_eq!(
            profile.skills.iter().cloned().collect::<Vec<_>>(),
            vec!["python", "sql"]
        );
        assert!(profile.has_experience());
    }
}
