use std::sync::Arc;

use crate::config::Config;
use crate::corpus::store::CorpusStore;
use crate::recommend::recommender::Recommender;
use crate::skills::extractor::SkillExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vocabulary-backed extractor, shared by resume parsing and corpus ingestion.
    pub extractor: Arc<SkillExtractor>,
    /// Current corpus snapshot; rebuilt wholesale and swapped, never edited in place.
    pub corpus: Arc<CorpusStore>,
    pub recommender: Recommender,
}
