use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::model::intent::{CommandDomain, Intent, TranslationContext, TranslationResult};
use crate::parse::{
    classify_command, classify_intent, domain_scores, extract_parameters, parse_style_command,
    ExtractedParameters, StyleCommand,
};
use crate::server::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub input: String,
    pub strategy: Option<String>,
    #[serde(default)]
    pub best: bool,
    #[serde(default)]
    pub context: TranslationContext,
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub nodes: usize,
    pub relationships: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategiesResponse {
    pub strategies: Vec<String>,
    pub default_strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DomainScore {
    pub domain: CommandDomain,
    pub score: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub domain: CommandDomain,
    pub domain_scores: Vec<DomainScore>,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_command: Option<StyleCommand>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<StudioError> for ApiError {
    fn from(err: StudioError) -> Self {
        let status = match &err {
            StudioError::StrategyNotFound(_) | StudioError::NodeNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            StudioError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            StudioError::DuplicateNode(_) | StudioError::DuplicateRelationship(_) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse { error: self.message });
        (self.status, body).into_response()
    }
}

fn require_input(input: &str) -> Result<&str, ApiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StudioError::InvalidQuery("input must not be empty".to_string()).into());
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        nodes: state.graph.node_count().await,
        relationships: state.graph.relationship_count().await,
    })
}

pub async fn strategies(State(state): State<AppState>) -> Json<StrategiesResponse> {
    Json(StrategiesResponse {
        strategies: state
            .translator
            .strategies()
            .into_iter()
            .map(str::to_string)
            .collect(),
        default_strategy: state.translator.default_strategy().map(str::to_string),
    })
}

pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslationResult>, ApiError> {
    let input = require_input(&request.input)?;
    let translator = &state.translator;

    let result = if request.best {
        translator
            .translate_with_best_strategy(input, &request.context)
            .await
    } else if let Some(name) = request.strategy.as_deref() {
        translator
            .translate_with_strategy(input, name, &request.context)
            .await?
    } else {
        translator.translate_intent(input, &request.context).await
    };

    Ok(Json(result))
}

pub async fn classify(Json(request): Json<InputRequest>) -> Result<Json<ClassifyResponse>, ApiError> {
    let input = require_input(&request.input)?;
    Ok(Json(ClassifyResponse {
        domain: classify_command(input),
        domain_scores: domain_scores(input)
            .into_iter()
            .map(|(domain, score)| DomainScore { domain, score })
            .collect(),
        intent: classify_intent(input),
        style_command: parse_style_command(input),
    }))
}

pub async fn extract(
    Json(request): Json<InputRequest>,
) -> Result<Json<ExtractedParameters>, ApiError> {
    let input = require_input(&request.input)?;
    Ok(Json(extract_parameters(input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorConfig;
    use crate::server::build_router;
    use crate::store::graph::{GraphStore, InMemoryGraphStore};
    use crate::store::seed::seed_concept_graph;
    use crate::translate::IntentTranslator;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn state() -> AppState {
        let graph: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::new());
        seed_concept_graph(graph.as_ref()).await.unwrap();
        let translator =
            IntentTranslator::with_default_strategies(graph.clone(), &TranslatorConfig::default())
                .unwrap();
        AppState::new(translator, graph)
    }

    async fn call(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = build_router(state().await).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_graph_size() {
        let (status, body) = call("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["nodes"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_strategies_lists_registration_order() {
        let (status, body) = call("GET", "/strategies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["strategies"],
            json!(["context-aware", "pattern-matching", "graph-enhanced"])
        );
        assert_eq!(body["defaultStrategy"], "context-aware");
    }

    #[tokio::test]
    async fn test_translate_default_and_named() {
        let (status, body) =
            call("POST", "/translate", Some(json!({"input": "draw a red circle"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strategy"], "context-aware");
        assert_eq!(body["intent"]["type"], "draw.create");
        assert_eq!(body["parameters"]["colors"], json!(["red"]));

        let (status, body) = call(
            "POST",
            "/translate",
            Some(json!({"input": "paint a sunset", "strategy": "graph-enhanced"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"]["type"], "style.applyTheme");
        assert_eq!(body["parameters"]["palette"], "warm");
    }

    #[tokio::test]
    async fn test_translate_best_with_context() {
        let (status, body) = call(
            "POST",
            "/translate",
            Some(json!({
                "input": "draw a star",
                "best": true,
                "context": {"recentIntents": [{
                    "type": "draw.create",
                    "domain": "drawing",
                    "parameters": {},
                    "confidence": 0.7,
                    "rawInput": "draw a line"
                }]}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strategy"], "context-aware");
        assert_eq!(body["alternativeIntents"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_not_found() {
        let (status, body) = call(
            "POST",
            "/translate",
            Some(json!({"input": "draw", "strategy": "neural"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("neural"));
    }

    #[tokio::test]
    async fn test_empty_input_is_bad_request() {
        let (status, body) = call("POST", "/classify", Some(json!({"input": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("input must not be empty"));

        let (status, _) = call("POST", "/translate", Some(json!({"input": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classify_and_extract() {
        let (status, body) =
            call("POST", "/classify", Some(json!({"input": "set primary to #3b82f6"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["domain"], "styling");
        assert_eq!(body["styleCommand"]["command"], "setColor");
        assert_eq!(body["styleCommand"]["colorValue"], "#3b82f6");

        let (status, body) = call(
            "POST",
            "/extract",
            Some(json!({"input": "move it 20px to the left in 2s"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sizes"], json!(["20px"]));
        assert_eq!(body["timing"], json!(["2s"]));
        assert!(body.get("colors").is_none());
    }
}
