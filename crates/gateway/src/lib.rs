//! HTTP API gateway for MathMentor.
//!
//! Exposes the solving pipeline and the feedback log over REST:
//!
//! - `GET /health` — liveness and version
//! - `POST /api/v1/solve` — run the pipeline on `{"text": ...}`
//! - `POST /api/v1/feedback` — append a confirmed solution to memory
//!
//! Pipeline failures surface as 502 with a generic diagnostic body; the
//! internal error text stays in the logs. Built on Axum.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use mathmentor_config::AppConfig;
use mathmentor_core::{MemoryStore, NewRecord, PipelineResult};
use mathmentor_knowledge::VectorIndex;
use mathmentor_memory::FileStore;
use mathmentor_pipeline::Pipeline;

/// Everything a request handler needs, shared behind one `Arc`.
pub struct GatewayState {
    pub pipeline: Pipeline,
    pub memory: Arc<dyn MemoryStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Assemble the router; split out so tests can drive it without a socket.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/solve", post(solve_handler))
        .route("/api/v1/feedback", post(feedback_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
///
/// Builds the provider, stores, and pipeline once from the config and shares
/// them across requests. The knowledge index is opened if already built,
/// otherwise built from the configured reference document.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = mathmentor_providers::build_from_config(&config)?;

    let memory: Arc<dyn MemoryStore> = Arc::new(FileStore::new(config.memory.path.clone()));
    let knowledge = Arc::new(
        VectorIndex::open_or_build(
            provider.clone(),
            &config.embedding_model,
            &config.knowledge.index_dir,
            &config.knowledge.source_path,
            config.knowledge.chunk_size,
        )
        .await?,
    );

    let mut pipeline = Pipeline::new(
        provider,
        memory.clone(),
        knowledge,
        &config.generation_model,
    )
    .with_temperature(config.temperature)
    .with_top_k(config.knowledge.top_k);
    if let Some(max_tokens) = config.max_tokens {
        pipeline = pipeline.with_max_tokens(max_tokens);
    }

    let state = Arc::new(GatewayState { pipeline, memory });
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(addr = %addr, "gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Generic failure body; internal error details go to the logs only.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Deserialize)]
struct SolveRequest {
    text: String,
}

async fn solve_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SolveRequest>,
) -> Result<Json<PipelineResult>, (StatusCode, Json<ErrorBody>)> {
    if payload.text.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                error: "text must not be empty",
            }),
        ));
    }

    match state.pipeline.run(&payload.text).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!(error = %e, "pipeline run failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "The solver is temporarily unavailable.",
                }),
            ))
        }
    }
}

#[derive(Deserialize)]
struct FeedbackRequest {
    question: String,
    solution: String,
    explanation: String,
}

#[derive(Serialize)]
struct FeedbackResponse {
    id: u64,
}

async fn feedback_handler(
    State(state): State<SharedState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, (StatusCode, Json<ErrorBody>)> {
    let record = NewRecord::new(payload.question, payload.solution, payload.explanation);
    match state.memory.append(record).await {
        Ok(stored) => {
            info!(id = stored.id, "feedback recorded via gateway");
            Ok(Json(FeedbackResponse { id: stored.id }))
        }
        Err(e) => {
            error!(error = %e, "feedback append failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Could not record feedback.",
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mathmentor_core::{
        CompletionRequest, CompletionResponse, KnowledgeError, KnowledgeStore, Provider,
        ProviderError,
    };
    use mathmentor_memory::InMemoryStore;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        next: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                next: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            let mut next = self.next.lock().unwrap();
            let responses = self.responses.lock().unwrap();
            let text = responses
                .get(*next)
                .unwrap_or_else(|| panic!("no scripted response for call #{}", *next))
                .clone();
            *next += 1;
            Ok(CompletionResponse {
                text,
                model: "scripted-model".into(),
                usage: None,
            })
        }
    }

    struct StaticKnowledge {
        fail: bool,
    }

    #[async_trait]
    impl KnowledgeStore for StaticKnowledge {
        fn name(&self) -> &str {
            "static"
        }

        async fn retrieve(&self, _query: &str, _k: usize) -> Result<String, KnowledgeError> {
            if self.fail {
                return Err(KnowledgeError::EmptyIndex);
            }
            Ok("## Algebra\nSubtract to isolate x.".to_string())
        }

        async fn chunk_count(&self) -> Result<usize, KnowledgeError> {
            Ok(1)
        }
    }

    fn test_state(provider: ScriptedProvider, knowledge_fails: bool) -> SharedState {
        let memory: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new());
        let pipeline = Pipeline::new(
            Arc::new(provider),
            memory.clone(),
            Arc::new(StaticKnowledge {
                fail: knowledge_fails,
            }),
            "test-model",
        );
        Arc::new(GatewayState { pipeline, memory })
    }

    fn solved_state() -> SharedState {
        test_state(
            ScriptedProvider::new(&[
                r#"{"problem_text": "Solve x + 5 = 10", "topic": "algebra", "needs_clarification": false}"#,
                "x = 5",
                r#"{"verdict": "VERIFIED", "reason": "fine"}"#,
                "Subtract five from both sides.",
            ]),
            false,
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(solved_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn solve_returns_pipeline_result() {
        let app = build_router(solved_state());

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/solve")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "Solve x + 5 = 10"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["confidence"], 0.95);
        assert_eq!(json["trace"].as_array().unwrap().len(), 7);
        assert_eq!(json["solution"], "x = 5");
    }

    #[tokio::test]
    async fn solve_maps_pipeline_failure_to_502() {
        let app = build_router(test_state(
            ScriptedProvider::new(&[
                r#"{"problem_text": "Solve x + 5 = 10", "topic": "algebra", "needs_clarification": false}"#,
            ]),
            true,
        ));

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/solve")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "Solve x + 5 = 10"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "The solver is temporarily unavailable.");
    }

    #[tokio::test]
    async fn blank_solve_text_is_unprocessable() {
        let app = build_router(solved_state());

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/solve")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "   "}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_text_field_is_unprocessable() {
        let app = build_router(solved_state());

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/solve")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"problem": "Solve x + 5 = 10"}"#))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn feedback_appends_and_returns_id() {
        let state = solved_state();
        let app = build_router(state.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/feedback")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"question": "Solve x + 5 = 10", "solution": "x = 5", "explanation": "Subtract."}"#,
            ))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["id"], 1);
        assert_eq!(state.memory.count().await.unwrap(), 1);
    }
}
