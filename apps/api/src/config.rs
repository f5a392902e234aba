use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::recommend::experience_fit::DEFAULT_ALPHA;
use crate::skills::vocabulary::VocabularyFormat;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub vocabulary_path: PathBuf,
    pub vocabulary_format: VocabularyFormat,
    /// Corpus loaded at startup. `None` starts the service with no listings.
    pub job_data_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
    /// Blend weight between similarity and experience fit. 1.0 disables the experience term.
    pub recommend_alpha: f32,
    pub default_top_n: usize,
}

pub const DEFAULT_TOP_N: usize = 10;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vocabulary_path = lookup("VOCABULARY_PATH")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'VOCABULARY_PATH' is not set")?;

        let vocabulary_format = match lookup("VOCABULARY_FORMAT") {
            Some(raw) => raw
                .parse::<VocabularyFormat>()
                .map_err(|e| anyhow!("VOCABULARY_FORMAT: {e}"))?,
            None => VocabularyFormat::default(),
        };

        let recommend_alpha = match lookup("RECOMMEND_ALPHA") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .context("RECOMMEND_ALPHA must be a number")?,
            None => DEFAULT_ALPHA,
        };
        if !(0.0..=1.0).contains(&recommend_alpha) {
            bail!("RECOMMEND_ALPHA must be within [0, 1], got {recommend_alpha}");
        }

        let default_top_n = match lookup("DEFAULT_TOP_N") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .context("DEFAULT_TOP_N must be a positive integer")?,
            None => DEFAULT_TOP_N,
        };
        if default_top_n == 0 {
            bail!("DEFAULT_TOP_N must be a positive integer");
        }

        Ok(Config {
            vocabulary_path: PathBuf::from(vocabulary_path),
            vocabulary_format,
            job_data_path: lookup("JOB_DATA_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            recommend_alpha,
            default_top_n,
        })
    }
}
