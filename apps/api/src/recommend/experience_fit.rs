//! Experience compatibility and its blend with skill similarity.
//!
//! ```text
//! fit   = 1.0                      if profile ≥ required
//!       = profile / required       otherwise
//! final = α·similarity + (1-α)·fit
//! ```
//!
//! Unknown experience on either side (profile 0, listing `None`) counts as a full fit,
//! so missing data never costs score. The fit is monotonic in profile years only from the
//! first known year upward: 0 means "unknown", so a profile that states a small positive
//! figure can score below the same profile with no figure at all.
//!
//! Listings with zero similarity stay at zero: experience alone does not surface an
//! unrelated job.

/// Default weight on skill similarity.
pub const DEFAULT_ALPHA: f32 = 0.85;

/// Compatibility in [0, 1], or `None` when either side is unknown.
pub fn experience_fit(profile_years: f32, required_years: Option<f32>) -> Option<f32> {
    let required = required_years?;
    if profile_years <= 0.0 {
        return None;
    }
    if required <= 0.0 || profile_years >= required {
        return Some(1.0);
    }
    Some((profile_years / required).clamp(0.0, 1.0))
}

/// Final score in [0, 1].
pub fn blend(similarity: f32, fit: Option<f32>, alpha: f32) -> f32 {
    if !similarity.is_finite() || similarity <= 0.0 {
        return 0.0;
    }
    let similarity = similarity.min(1.0);
    let fit = fit.unwrap_or(1.0);
    (alpha * similarity + (1.0 - alpha) * fit).clamp(0.0, 1.0)
}
