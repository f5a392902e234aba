#![allow(dead_code)]

//! Skill Vocabulary: canonical skill names and aliases, indexed for case-insensitive lookup.
//!
//! Two source formats are accepted:
//! - a table with `id`, `name`, `aliases` columns (optional `category`); aliases are
//!   separated by `|` or `;`
//! - a flat list where every non-empty cell is a skill name (no header)
//!
//! Every lookup key goes through `normalize_phrase`, so matching is case-insensitive and
//! whitespace/punctuation-normalised. An alias claimed by two entries stays with the first
//! one registered; the collision is logged.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::MatchError;
use crate::skills::normalize::{normalize_phrase, tokenize};

/// A single known skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub id: String,
    pub name: String,
    pub aliases: BTreeSet<String>,
    pub category: Option<String>,
}

impl SkillEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: BTreeSet::new(),
            category: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// An alias pattern keyed under its leading token.
#[derive(Debug, Clone)]
pub(crate) struct AliasPattern {
    pub tokens: Vec<String>,
    pub entry: usize,
}

#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    entries: Vec<SkillEntry>,
    /// normalised alias or canonical name → entry index
    lookup: HashMap<String, usize>,
    /// leading token → patterns, longest first
    by_leading_token: HashMap<String, Vec<AliasPattern>>,
}

impl SkillVocabulary {
    /// Builds the index from entries. Duplicate canonical names are dropped (first wins).
    pub fn from_entries(entries: Vec<SkillEntry>) -> Result<Self, MatchError> {
        let mut kept: Vec<SkillEntry> = Vec::with_capacity(entries.len());
        let mut lookup: HashMap<String, usize> = HashMap::new();
        let mut canonical_seen: HashMap<String, String> = HashMap::new();

        for entry in entries {
            let canonical = normalize_phrase(&entry.name);
            if canonical.is_empty() {
                warn!("Skipping skill entry '{}' with an empty name", entry.id);
                continue;
            }
            if let Some(first_id) = canonical_seen.get(&canonical) {
                warn!(
                    "Duplicate canonical skill '{}' (entry '{}'); keeping entry '{}'",
                    entry.name, entry.id, first_id
                );
                continue;
            }
            canonical_seen.insert(canonical.clone(), entry.id.clone());

            let index = kept.len();
            let keys = std::iter::once(canonical)
                .chain(entry.aliases.iter().map(|a| normalize_phrase(a)))
                .filter(|k| !k.is_empty());
            for key in keys {
                match lookup.get(&key) {
                    Some(&owner) if owner != index => warn!(
                        "Ambiguous skill alias '{}': claimed by '{}' and '{}'; keeping '{}'",
                        key, kept[owner].name, entry.name, kept[owner].name
                    ),
                    Some(_) => {}
                    None => {
                        lookup.insert(key, index);
                    }
                }
            }
            kept.push(entry);
        }

        if kept.is_empty() {
            return Err(MatchError::VocabularyLoad(
                "vocabulary contains no skills".to_string(),
            ));
        }

        let mut by_leading_token: HashMap<String, Vec<AliasPattern>> = HashMap::new();
        for (key, &entry) in &lookup {
            let tokens = tokenize(key);
            if let Some(first) = tokens.first().cloned() {
                by_leading_token
                    .entry(first)
                    .or_default()
                    .push(AliasPattern { tokens, entry });
            }
        }
        for patterns in by_leading_token.values_mut() {
            // Longest first; equal lengths ordered by text so scans are deterministic.
            patterns.sort_by(|a, b| {
                b.tokens
                    .len()
                    .cmp(&a.tokens.len())
                    .then_with(|| a.tokens.cmp(&b.tokens))
            });
        }

        Ok(Self {
            entries: kept,
            lookup,
            by_leading_token,
        })
    }

    /// Loads the `id,name,aliases[,category]` table format.
    pub fn load<R: Read>(source: R) -> Result<Self, MatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| MatchError::VocabularyLoad(format!("unreadable header row: {e}")))?
            .clone();
        let column = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };

        let id_col = column(&["id"]);
        let name_col = column(&["name"]);
        let alias_col = column(&["aliases", "alias"]);
        let category_col = column(&["category"]);

        let (id_col, name_col, alias_col) = match (id_col, name_col, alias_col) {
            (Some(i), Some(n), Some(a)) => (i, n, a),
            _ => {
                let missing: Vec<&str> = [("id", id_col), ("name", name_col), ("aliases", alias_col)]
                    .into_iter()
                    .filter(|(_, col)| col.is_none())
                    .map(|(name, _)| name)
                    .collect();
                return Err(MatchError::VocabularyLoad(format!(
                    "missing required column(s): {}",
                    missing.join(", ")
                )));
            }
        };

        let mut entries = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| MatchError::VocabularyLoad(format!("row {}: {e}", row + 1)))?;
            let field = |col: usize| record.get(col).unwrap_or("").to_string();

            let name = field(name_col);
            if name.is_empty() {
                warn!("Skipping vocabulary row {} with no name", row + 1);
                continue;
            }
            let mut id = field(id_col);
            if id.is_empty() {
                id = name.clone();
            }

            let aliases = field(alias_col)
                .split(['|', ';'])
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect::<Vec<_>>();
            let mut entry = SkillEntry::new(id, name).with_aliases(aliases);
            if let Some(category) = category_col.map(field).filter(|c| !c.is_empty()) {
                entry = entry.with_category(category);
            }
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(MatchError::VocabularyLoad(
                "vocabulary source has no rows".to_string(),
            ));
        }
        Self::from_entries(entries)
    }

    /// Loads a flat skill list: every non-empty cell of every row is a skill name.
    pub fn from_skill_list<R: Read>(source: R) -> Result<Self, MatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| MatchError::VocabularyLoad(e.to_string()))?;
            for cell in record.iter().filter(|c| !c.is_empty()) {
                entries.push(SkillEntry::new(cell, cell));
            }
        }

        if entries.is_empty() {
            return Err(MatchError::VocabularyLoad(
                "skill list is empty".to_string(),
            ));
        }
        Self::from_entries(entries)
    }

    /// Opens `path` and loads it in the given format.
    pub fn load_path(path: &Path, format: VocabularyFormat) -> Result<Self, MatchError> {
        let file = File::open(path)
            .map_err(|e| MatchError::VocabularyLoad(format!("{}: {e}", path.display())))?;
        let vocabulary = match format {
            VocabularyFormat::Table => Self::load(file)?,
            VocabularyFormat::List => Self::from_skill_list(file)?,
        };
        info!(
            "Loaded {} skills ({} lookup keys) from {}",
            vocabulary.len(),
            vocabulary.lookup.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    /// Exact, case-insensitive, whitespace-normalised lookup of a name or alias.
    pub fn match_token(&self, token: &str) -> Option<&SkillEntry> {
        self.lookup
            .get(&normalize_phrase(token))
            .map(|&i| &self.entries[i])
    }

    pub fn entry(&self, index: usize) -> &SkillEntry {
        &self.entries[index]
    }

    pub fn entries(&self) -> &[SkillEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidate alias patterns starting with `token`, longest first.
    pub(crate) fn patterns_starting_with(&self, token: &str) -> &[AliasPattern] {
        self.by_leading_token
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// On-disk layout of the vocabulary source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VocabularyFormat {
    #[default]
    Table,
    List,
}

impl std::str::FromStr for VocabularyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "list" => Ok(Self::List),
            other => Err(format!("unknown vocabulary format '{other}' (expected table|list)")),
        }
    }
}
