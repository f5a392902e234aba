use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::skills::experience::required_years;
use crate::skills::extractor::SkillExtractor;

/// A listing record as supplied by a collaborator (CSV row or JSON object).
///
/// Every field is optional at this stage; `JobListing::from_raw` validates it once.
/// Column headers from scraped job exports are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default, alias = "Id", alias = "ID", alias = "job_id", alias = "Job Id")]
    pub id: Option<String>,
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Company")]
    pub company: Option<String>,
    #[serde(default, alias = "Company Name")]
    pub company_name: Option<String>,
    #[serde(default, alias = "Location")]
    pub location: Option<String>,
    #[serde(default, alias = "Salary")]
    pub salary: Option<String>,
    #[serde(default, alias = "Job Type", alias = "job_type")]
    pub employment_type: Option<String>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Required Experience")]
    pub required_experience: Option<NumberOrText>,
    #[serde(default, alias = "Link")]
    pub link: Option<String>,
    #[serde(default, alias = "Detail URL")]
    pub detail_url: Option<String>,
    #[serde(default, alias = "Company Apply Url")]
    pub apply_url: Option<String>,
}

/// Keys under which a record's id may arrive.
const ID_KEYS: [&str; 5] = ["id", "Id", "ID", "job_id", "Job Id"];

impl RawListing {
    /// Decodes one JSON object. Numeric ids are accepted and kept as their decimal text;
    /// any other shape problem rejects only this record.
    pub fn from_json_value(mut value: serde_json::Value) -> Result<Self, RecordRejection> {
        if let Some(object) = value.as_object_mut() {
            for key in ID_KEYS {
                if let Some(id) = object.get_mut(key).filter(|id| id.is_number()) {
                    *id = serde_json::Value::String(id.to_string());
                }
            }
        }
        serde_json::from_value(value).map_err(|e| RecordRejection::Malformed(e.to_string()))
    }
}

/// Numeric cells arrive as numbers from JSON and as text from CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_years(&self) -> Result<Option<f32>, RecordRejection> {
        let value = match self {
            NumberOrText::Number(n) => *n as f32,
            NumberOrText::Text(t) if t.trim().is_empty() => return Ok(None),
            NumberOrText::Text(t) => t
                .trim()
                .trim_end_matches('+')
                .parse::<f32>()
                .map_err(|_| RecordRejection::InvalidExperience(t.clone()))?,
        };
        if value.is_finite() && value >= 0.0 {
            Ok(Some(value))
        } else {
            Err(RecordRejection::InvalidExperience(value.to_string()))
        }
    }
}

/// Why a raw record was not admitted into the corpus.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordRejection {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unparseable required experience '{0}'")]
    InvalidExperience(String),

    #[error("duplicate listing id '{0}'")]
    DuplicateId(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A validated job listing, immutable for the lifetime of a corpus snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub employment_type: String,
    pub description: String,
    pub link: Option<String>,
    /// Years of experience asked for; `None` when the listing gives no signal.
    pub required_experience: Option<f32>,
    /// Canonical vocabulary skills mentioned in the title or description.
    pub required_skills: BTreeSet<String>,
}

impl JobListing {
    /// Validates a raw record and derives its skill set and experience requirement.
    ///
    /// `id`, `title`, `company` and `description` are required; other text fields
    /// default to empty strings.
    pub fn from_raw(raw: RawListing, extractor: &SkillExtractor) -> Result<Self, RecordRejection> {
        let id = required(raw.id, "id")?;
        let title = required(raw.title, "title")?;
        let company = required(
            non_empty(raw.company).or_else(|| non_empty(raw.company_name)),
            "company",
        )?;
        let description = required(raw.description, "description")?;

        let required_experience = match raw.required_experience {
            Some(value) => value.as_years()?,
            None => None,
        }
        .or_else(|| required_years(&title, &description));

        let required_skills = extractor.find_skills(&format!("{title}\n{description}"));

        Ok(Self {
            link: non_empty(raw.link)
                .or_else(|| non_empty(raw.detail_url))
                .or_else(|| non_empty(raw.apply_url)),
            location: optional_text(raw.location),
            salary: optional_text(raw.salary),
            employment_type: optional_text(raw.employment_type),
            id,
            title,
            company,
            description,
            required_experience,
            required_skills,
        })
    }

    /// Text that represents this listing in the vector space.
    pub fn document_text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RecordRejection> {
    non_empty(value).ok_or(RecordRejection::MissingField(field))
}

fn optional_text(value: Option<String>) -> String {
    non_empty(value).unwrap_or_default()
}
