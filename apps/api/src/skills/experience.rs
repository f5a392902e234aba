//! Years-of-experience heuristics.
//!
//! Best-effort only. Two signals are read from free text and the larger one wins:
//! - explicit figures next to a unit: "5 years", "3+ yrs", "2.5 year"
//! - employment date ranges: "Jan 2019 - Present", "March 2016 to June 2018"
//!   (overlapping ranges are merged before summing)
//!
//! When neither signal is present the estimate is 0.0, never a guess.

use chrono::{Datelike, Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static EXPLICIT_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\b")
        .expect("explicit years pattern is valid")
});

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b([a-z]{3,9})\.?\s+(\d{4})\s*(?:-|–|—|to)\s*(?:([a-z]{3,9})\.?\s+(\d{4})|(present|current|now))\b",
    )
    .expect("date range pattern is valid")
});

/// Seniority keywords in listing titles, checked in order.
const TITLE_SENIORITY: &[(&str, f32)] = &[
    ("intern", 0.0),
    ("junior", 0.0),
    ("entry level", 0.0),
    ("principal", 7.0),
    ("staff", 7.0),
    ("lead", 7.0),
    ("senior", 5.0),
    ("sr", 5.0),
    ("mid level", 3.0),
];

/// Largest "<N> years" figure in the text.
pub fn explicit_years(text: &str) -> Option<f32> {
    EXPLICIT_YEARS
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<f32>().ok())
        .fold(None, |best: Option<f32>, y| Some(best.map_or(y, |b| b.max(y))))
}

/// Total years covered by employment date ranges, with overlaps merged.
pub fn date_range_years(text: &str, today: NaiveDate) -> Option<f32> {
    let today_index = month_index(today.year(), today.month0());

    let mut spans: Vec<(i32, i32)> = DATE_RANGE
        .captures_iter(text)
        .filter_map(|c| {
            let start = month_index(c[2].parse().ok()?, parse_month(&c[1])?);
            let end = match (c.get(3), c.get(4)) {
                (Some(month), Some(year)) => {
                    month_index(year.as_str().parse().ok()?, parse_month(month.as_str())?)
                }
                _ => today_index,
            };
            (end >= start && start <= today_index).then_some((start, end.min(today_index)))
        })
        .collect();

    if spans.is_empty() {
        return None;
    }

    spans.sort_unstable();
    let mut total_months = 0;
    let (mut cur_start, mut cur_end) = spans[0];
    for &(start, end) in &spans[1..] {
        if start <= cur_end {
            cur_end = cur_end.max(end);
        } else {
            total_months += cur_end - cur_start;
            (cur_start, cur_end) = (start, end);
        }
    }
    total_months += cur_end - cur_start;

    Some(round_tenth(total_months as f32 / 12.0))
}

/// Profile estimate: the larger of the explicit and date-range signals, else 0.
pub fn estimate_years(text: &str, today: NaiveDate) -> f32 {
    let explicit = explicit_years(text).unwrap_or(0.0);
    let ranges = date_range_years(text, today).unwrap_or(0.0);
    explicit.max(ranges)
}

/// Experience a listing asks for: an explicit figure in the description, else a
/// seniority keyword in the title, else unknown.
pub fn required_years(title: &str, description: &str) -> Option<f32> {
    explicit_years(description).or_else(|| title_seniority(title))
}

fn title_seniority(title: &str) -> Option<f32> {
    let words = crate::skills::normalize::normalize_phrase(&title.replace('-', " "));
    let padded = format!(" {words} ");
    TITLE_SENIORITY
        .iter()
        .find(|(keyword, _)| padded.contains(&format!(" {keyword} ")))
        .map(|&(_, years)| years)
}

/// Zero-based month from a full or three-letter name; "Sept" is also accepted.
fn parse_month(word: &str) -> Option<u32> {
    let word = word.to_ascii_lowercase();
    let name = if word == "sept" { "sep" } else { word.as_str() };
    name.parse::<Month>()
        .ok()
        .map(|month| month.number_from_month() - 1)
}

fn month_index(year: i32, month0: u32) -> i32 {
    year * 12 + month0 as i32
}

fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_explicit_years_takes_maximum() {
        let text = "2 years of Java, 5+ yrs of Python and 3 year of Go";
        assert_eq!(explicit_years(text), Some(5.0));
    }

    #[test]
    fn test_explicit_years_fractional() {
        assert_eq!(explicit_years("about 2.5 years in industry"), Some(2.5));
    }

    #[test]
    fn test_no_experience_defaults_to_zero() {
        assert_eq!(explicit_years("python sql docker"), None);
        assert_eq!(estimate_years("python sql docker", today()), 0.0);
        assert_eq!(estimate_years("", today()), 0.0);
    }

    #[test]
    fn test_bare_numbers_are_ignored() {
        assert_eq!(explicit_years("Managed 40 engineers in 2019"), None);
    }

    #[test]
    fn test_closed_date_range() {
        let years = date_range_years("Acme Corp, Jan 2018 - Jan 2020", today());
        assert_eq!(years, Some(2.0));
    }

    #[test]
    fn test_present_uses_reference_date() {
        let years = date_range_years("Globex, June 2022 to Present", today());
        assert_eq!(years, Some(2.0));
    }

    #[test]
    fn test_overlapping_ranges_are_merged() {
        let text = "Jan 2018 - Jan 2020 at Acme; Jan 2019 - Jan 2021 at Initech";
        assert_eq!(date_range_years(text, today()), Some(3.0));
    }

    #[test]
    fn test_unknown_month_word_ignored() {
        assert_eq!(date_range_years("Version 2018 - 2020", today()), None);
        assert_eq!(date_range_years("Blah 2018 - Present", today()), None);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_month("Jan"), Some(0));
        assert_eq!(parse_month("SEPTEMBER"), Some(8));
        assert_eq!(parse_month("Sept"), Some(8));
        assert_eq!(parse_month("dec"), Some(11));
        assert_eq!(parse_month("Version"), None);
        assert_eq!(parse_month("Marc"), None);
    }

    #[test]
    fn test_estimate_prefers_larger_signal() {
        let text = "3 years of Rust. Sept 2014 - Sept 2020 at Hooli.";
        assert_eq!(estimate_years(text, today()), 6.0);
    }

    #[test]
    fn test_required_years_from_description() {
        assert_eq!(
            required_years("Backend Engineer", "Requires 4+ years of Python"),
            Some(4.0)
        );
    }

    #[test]
    fn test_required_years_from_title_seniority() {
        assert_eq!(required_years("Senior Data Engineer", "Build pipelines"), Some(5.0));
        assert_eq!(required_years("Junior Developer", ""), Some(0.0));
        assert_eq!(required_years("Tech Lead - Payments", ""), Some(7.0));
        assert_eq!(required_years("Software Engineer", "Build things"), None);
    }

    #[test]
    fn test_title_seniority_matches_whole_words() {
        assert_eq!(required_years("Internal Tools Engineer", ""), None);
        assert_eq!(required_years("Leadership Coach", ""), None);
    }
}
