//! Axum route handlers for profile extraction, recommendations and corpus refresh.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::corpus::store::{CorpusStatus, RebuildReport};
use crate::errors::{AppError, MatchError};
use crate::models::profile::UserProfile;
use crate::recommend::recommender::{validate_top_n, RecommendationSet};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractProfileRequest {
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: f32,
    pub top_n: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendResumeRequest {
    pub resume_text: String,
    pub top_n: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResumeResponse {
    pub profile: UserProfile,
    #[serde(flatten)]
    pub recommendations: RecommendationSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/profile
///
/// Extracts skills and years of experience from pre-decoded resume text.
/// Empty or unrecognisable text yields an empty profile, not an error.
pub async fn handle_extract_profile(
    State(state): State<AppState>,
    Json(request): Json<ExtractProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.extractor.extract(&request.resume_text)))
}

/// POST /api/v1/recommendations
///
/// Ranks the current corpus against a declared skill list.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendationSet>, AppError> {
    if !request.experience_years.is_finite() || request.experience_years < 0.0 {
        return Err(AppError::Validation(
            "experience_years must be a non-negative number".to_string(),
        ));
    }
    let top_n = resolve_top_n(&state, request.top_n)?;

    let profile = state
        .extractor
        .profile_from_declared(&request.skills, request.experience_years);
    let recommender = state.recommender;
    let corpus = Arc::clone(&state.corpus);
    let set = run_blocking(move || recommender.recommend_from_store(&profile, &corpus, top_n))
        .await?;

    Ok(Json(set))
}

/// POST /api/v1/recommendations/resume
///
/// Extraction and ranking in one call.
pub async fn handle_recommend_resume(
    State(state): State<AppState>,
    Json(request): Json<RecommendResumeRequest>,
) -> Result<Json<RecommendResumeResponse>, AppError> {
    let top_n = resolve_top_n(&state, request.top_n)?;

    let recommender = state.recommender;
    let corpus = Arc::clone(&state.corpus);
    let extractor = Arc::clone(&state.extractor);
    let response = run_blocking(move || {
        let profile = extractor.extract(&request.resume_text);
        let recommendations = recommender.recommend_from_store(&profile, &corpus, top_n)?;
        Ok(RecommendResumeResponse {
            profile,
            recommendations,
        })
    })
    .await?;

    Ok(Json(response))
}

/// GET /api/v1/corpus
pub async fn handle_corpus_status(State(state): State<AppState>) -> Json<CorpusStatus> {
    Json(state.corpus.status())
}

/// PUT /api/v1/corpus
///
/// Replaces the corpus with the supplied listings. Each element of the JSON array is
/// decoded on its own: malformed rows are skipped and reported, and only when none
/// survive does the request fail, leaving the previous corpus serving.
pub async fn handle_rebuild_corpus(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RebuildReport>, AppError> {
    let records: Vec<Value> = serde_json::from_slice(&body).map_err(|e| {
        AppError::Validation(format!("corpus body must be a JSON array of listings: {e}"))
    })?;

    let corpus = Arc::clone(&state.corpus);
    let extractor = Arc::clone(&state.extractor);
    let report = run_blocking(move || corpus.rebuild_from_json(records, &extractor)).await?;

    Ok(Json(report))
}

/// Runs index building or scoring on the blocking pool, off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, MatchError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(anyhow!("blocking task failed: {e}")))?;
    Ok(result?)
}

fn resolve_top_n(state: &AppState, requested: Option<i64>) -> Result<usize, AppError> {
    match requested {
        Some(top_n) => Ok(validate_top_n(top_n)?),
        None => Ok(state.config.default_top_n),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpus::store::CorpusStore;
    use crate::recommend::recommender::Recommender;
    use crate::routes::build_router;
    use crate::skills::extractor::SkillExtractor;
    use crate::skills::vocabulary::{SkillEntry, SkillVocabulary, VocabularyFormat};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let vocab = SkillVocabulary::from_entries(vec![
            SkillEntry::new("1", "python").with_aliases(["py"]),
            SkillEntry::new("2", "sql"),
            SkillEntry::new("3", "java"),
        ])
        .unwrap();
        AppState {
            config: Config {
                vocabulary_path: PathBuf::from("skills.csv"),
                vocabulary_format: VocabularyFormat::Table,
                job_data_path: None,
                port: 0,
                rust_log: "info".to_string(),
                recommend_alpha: 0.85,
                default_top_n: 10,
            },
            extractor: Arc::new(SkillExtractor::new(Arc::new(vocab))),
            corpus: Arc::new(CorpusStore::empty()),
            recommender: Recommender::default(),
        }
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn corpus_body() -> Value {
        json!([
            {"id": "1", "title": "Data Engineer", "company": "Acme", "description": "python sql"},
            {"id": "2", "title": "Backend Engineer", "company": "Globex", "description": "java spring"},
            {"id": "3", "title": "Broken", "company": "Initech"}
        ])
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(build_router(test_state()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_extract_profile() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/profile",
            Some(json!({"resume_text": "5 years of Py and SQL experience"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["python", "sql"]));
        assert_eq!(body["experience_years"], json!(5.0));
    }

    #[tokio::test]
    async fn test_recommend_without_corpus_is_flagged_empty() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/recommendations",
            Some(json!({"skills": ["python"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "empty_corpus");
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn test_rebuild_then_recommend() {
        let state = test_state();

        let (status, report) = send(
            build_router(state.clone()),
            Method::PUT,
            "/api/v1/corpus",
            Some(corpus_body()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["generation"], 1);
        assert_eq!(report["indexed"], 2);
        assert_eq!(report["skipped"][0]["id"], "3");

        let (status, body) = send(
            build_router(state.clone()),
            Method::POST,
            "/api/v1/recommendations",
            Some(json!({"skills": ["Python", "sql"], "top_n": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["generation"], 1);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "1");
        assert!(results[0]["score"].as_f64().unwrap() > 0.0);
        assert_eq!(results[1]["score"].as_f64().unwrap(), 0.0);

        let (status, body) = send(build_router(state), Method::GET, "/api/v1/corpus", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 1);
        assert_eq!(body["listings"], 2);
    }

    #[tokio::test]
    async fn test_rebuild_with_no_valid_rows_keeps_old_corpus() {
        let state = test_state();
        send(build_router(state.clone()), Method::PUT, "/api/v1/corpus", Some(corpus_body())).await;

        let (status, body) = send(
            build_router(state.clone()),
            Method::PUT,
            "/api/v1/corpus",
            Some(json!([{"id": "9", "title": "No company or description"}])),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EMPTY_CORPUS");
        assert_eq!(state.corpus.snapshot().unwrap().generation, 1);
    }

    #[tokio::test]
    async fn test_rebuild_skips_wrong_typed_row() {
        let state = test_state();
        let (status, report) = send(
            build_router(state.clone()),
            Method::PUT,
            "/api/v1/corpus",
            Some(json!([
                {"id": "1", "title": "Data Engineer", "company": "Acme", "description": "python sql"},
                {"id": "2", "title": ["bad"], "company": "Globex", "description": "java"}
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["indexed"], 1);
        assert_eq!(report["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(report["skipped"][0]["row"], 2);
        assert_eq!(state.corpus.snapshot().unwrap().index.listings()[0].id, "1");
    }

    #[tokio::test]
    async fn test_rebuild_accepts_numeric_ids() {
        let state = test_state();
        let (status, report) = send(
            build_router(state.clone()),
            Method::PUT,
            "/api/v1/corpus",
            Some(json!([
                {"id": 1, "title": "Data Engineer", "company": "Acme", "description": "python sql"},
                {"id": 2, "title": "Backend Engineer", "company": "Globex", "description": "java"}
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["indexed"], 2);
        assert_eq!(report["skipped"], json!([]));

        let (_, body) = send(
            build_router(state),
            Method::POST,
            "/api/v1/recommendations",
            Some(json!({"skills": ["java"], "top_n": 1})),
        )
        .await;
        assert_eq!(body["results"][0]["id"], "2");
    }

    #[tokio::test]
    async fn test_rebuild_with_non_array_body_uses_error_envelope() {
        let (status, body) = send(
            build_router(test_state()),
            Method::PUT,
            "/api/v1/corpus",
            Some(json!({"id": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_top_n_rejected() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/recommendations",
            Some(json!({"skills": ["python"], "top_n": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_negative_experience_rejected() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/v1/recommendations",
            Some(json!({"skills": ["python"], "experience_years": -1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recommend_from_resume_text() {
        let state = test_state();
        send(build_router(state.clone()), Method::PUT, "/api/v1/corpus", Some(corpus_body())).await;

        let (status, body) = send(
            build_router(state),
            Method::POST,
            "/api/v1/recommendations/resume",
            Some(json!({"resume_text": "Java developer, 3 years", "top_n": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["skills"], json!(["java"]));
        assert_eq!(body["results"][0]["id"], "2");
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }
}
