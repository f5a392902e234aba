mod config;
mod corpus;
mod errors;
mod models;
mod recommend;
mod routes;
mod skills;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::corpus::loader;
use crate::corpus::store::CorpusStore;
use crate::recommend::recommender::Recommender;
use crate::routes::build_router;
use crate::skills::extractor::SkillExtractor;
use crate::skills::vocabulary::SkillVocabulary;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary is mandatory; a bad source aborts startup.
    let vocabulary = SkillVocabulary::load_path(&config.vocabulary_path, config.vocabulary_format)
        .context("Failed to load skill vocabulary")?;
    let extractor = Arc::new(SkillExtractor::new(Arc::new(vocabulary)));

    let corpus = Arc::new(load_initial_corpus(&config, &extractor)?);

    let recommender = Recommender::new(config.recommend_alpha)?;
    info!(
        "Recommender alpha {} (experience adjustment {})",
        recommender.alpha(),
        if recommender.experience_adjustment_enabled() {
            "on"
        } else {
            "off"
        }
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        extractor,
        corpus,
        recommender,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the startup snapshot. An unset `JOB_DATA_PATH` or a file with no valid rows
/// starts the service with no corpus (one can be pushed later); a file that cannot be
/// opened or read aborts startup.
fn load_initial_corpus(config: &Config, extractor: &SkillExtractor) -> Result<CorpusStore> {
    let Some(path) = &config.job_data_path else {
        warn!("JOB_DATA_PATH not set; starting with an empty corpus");
        return Ok(CorpusStore::empty());
    };

    let ingested = loader::load_path(path, extractor)?;
    let store = CorpusStore::empty();
    match store.rebuild(ingested.listings) {
        Ok(generation) => info!("Corpus generation {generation} ready"),
        Err(e) => warn!("No usable listings in {}: {e}", path.display()),
    }
    Ok(store)
}
