//! HTTP API gateway for askrelay.
//!
//! Routes:
//! - `POST /ask`: run the ask pipeline, reply `{reply}`
//! - `GET /models`: the configured model catalog
//! - `GET /health`: liveness and version
//!
//! Every error leaves as JSON `{error}` via [`ApiError`].

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};

use askrelay_agent::pipeline::INVALID_MESSAGES;
use askrelay_agent::{AskPipeline, AskRequest};
use askrelay_config::AppConfig;
use askrelay_core::error::Error;
use askrelay_core::model::ModelOption;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: AskPipeline,
}

type SharedState = Arc<GatewayState>;

/// Wire the configured completion and search backends into a pipeline.
pub fn build_pipeline(config: Arc<AppConfig>) -> Result<AskPipeline, Error> {
    let completion = askrelay_providers::build_from_config(&config)?;
    let search = askrelay_tools::build_search_provider(&config)?;
    let deep_search = askrelay_tools::build_deep_search(&config)?;

    let mut pipeline = AskPipeline::new(config, completion)?.with_deep_search(Arc::new(deep_search));
    if let Some(search) = search {
        pipeline = pipeline.with_search(search);
    }
    Ok(pipeline)
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let gateway = &state.pipeline.config().gateway;
    let body_limit = gateway.max_body_bytes;
    let cors = cors_layer(&gateway.allowed_origins);

    Router::new()
        .route("/ask", post(ask_handler).fallback(method_not_allowed))
        .route("/models", get(models_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                info_span!(
                    "request",
                    id = %uuid::Uuid::new_v4(),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
}

/// CORS for the configured origins only; an empty list allows none.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let config = Arc::new(config);
    if let Err(e) = config.completion_readiness() {
        // Still serve /models and /health; /ask reports this per request.
        warn!("Completion is not ready: {e}");
    }

    let pipeline = build_pipeline(config)?;
    let app = build_router(Arc::new(GatewayState { pipeline }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Errors ---

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// An [`Error`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self.0);
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            detail: cfg!(debug_assertions).then(|| format!("{:?}", self.0)),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct AskResponse {
    reply: String,
}

async fn ask_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Unreadable ask body: {rejection}");
        Error::Validation(INVALID_MESSAGES.into())
    })?;

    let reply = state.pipeline.ask(request).await?;
    Ok(Json(AskResponse { reply }))
}

async fn method_not_allowed() -> ApiError {
    ApiError(Error::MethodNotAllowed)
}

async fn models_handler(State(state): State<SharedState>) -> Json<Vec<ModelOption>> {
    Json(state.pipeline.config().models.clone())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use askrelay_core::error::{ProviderError, SearchError};
    use askrelay_core::provider::{CompletionProvider, CompletionRequest, CompletionResponse};
    use askrelay_core::search::{SearchOptions, SearchProvider, SearchResult};
    use async_trait::async_trait;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct FakeCompletion {
        reply: Result<String, ProviderError>,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionProvider for FakeCompletion {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            let model = request.model.clone();
            self.calls.lock().unwrap().push(request);
            self.reply
                .clone()
                .map(|content| CompletionResponse { content, model })
        }
    }

    struct FakeSearch {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        fn name(&self) -> &str {
            "fake-search"
        }

        async fn search(
            &self,
            _query: &str,
            _options: SearchOptions,
        ) -> Result<Vec<SearchResult>, SearchError> {
            *self.calls.lock().unwrap() += 1;
            Err(SearchError::Network("unreachable".into()))
        }
    }

    struct Harness {
        app: Router,
        completion: Arc<FakeCompletion>,
        search: Arc<FakeSearch>,
    }

    fn harness(reply: Result<&str, ProviderError>, api_key: Option<&str>) -> Harness {
        let mut config = AppConfig::default();
        config.completion.api_key = api_key.map(String::from);

        let completion = Arc::new(FakeCompletion {
            reply: reply.map(String::from),
            calls: Mutex::new(Vec::new()),
        });
        let search = Arc::new(FakeSearch {
            calls: Mutex::new(0),
        });
        let pipeline = AskPipeline::new(Arc::new(config), completion.clone())
            .unwrap()
            .with_search(search.clone());

        Harness {
            app: build_router(Arc::new(GatewayState { pipeline })),
            completion,
            search,
        }
    }

    fn ready(reply: &str) -> Harness {
        harness(Ok(reply), Some("gsk-test"))
    }

    fn post_json(uri: &str, body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let h = ready("unused");
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = h.app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn models_lists_catalog_in_order() {
        let h = ready("unused");
        let req = Request::builder()
            .uri("/models")
            .body(Body::empty())
            .unwrap();

        let response = h.app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0], json!({"label": "LLaMA 3 8B", "value": "llama3-8b-8192"}));
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn ask_returns_reply() {
        let h = ready("4");
        let response = h
            .app
            .oneshot(post_json(
                "/ask",
                r#"{"messages":[{"role":"user","content":"what is 2+2"}],"model":"m1","timezone":"UTC"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"reply": "4"}));
        assert_eq!(h.completion.calls.lock().unwrap()[0].model, "m1");
        assert_eq!(*h.search.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn get_on_ask_is_405() {
        let h = ready("unused");
        let req = Request::builder()
            .method("GET")
            .uri("/ask")
            .body(Body::from("not even json"))
            .unwrap();

        let response = h.app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(json_body(response).await["error"], "Method not allowed");
        assert!(h.completion.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_messages_are_400_without_upstream_calls() {
        for body in [
            r#"{}"#,
            r#"{"messages":[]}"#,
            r#"{"messages":"hello"}"#,
            r#"{"messages":[{"role":"tool","content":"x"}]}"#,
            "not json",
        ] {
            let h = ready("unused");
            let response = h.app.oneshot(post_json("/ask", body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json_body(response).await["error"], INVALID_MESSAGES);
            assert!(h.completion.calls.lock().unwrap().is_empty());
            assert_eq!(*h.search.calls.lock().unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn missing_api_key_is_500() {
        let h = harness(Ok("unused"), None);
        let response = h
            .app
            .oneshot(post_json(
                "/ask",
                r#"{"messages":[{"role":"user","content":"hi"}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn empty_completion_is_500() {
        let h = harness(Err(ProviderError::EmptyReply("fake".into())), Some("k"));
        let response = h
            .app
            .oneshot(post_json(
                "/ask",
                r#"{"messages":[{"role":"user","content":"hi"}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Empty reply"));
    }

    #[tokio::test]
    async fn failing_search_still_replies() {
        let h = ready("fallback answer");
        let response = h
            .app
            .oneshot(post_json(
                "/ask",
                r#"{"messages":[{"role":"user","content":"today's news"}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["reply"], "fallback answer");
        assert_eq!(*h.search.calls.lock().unwrap(), 1);
    }

    #[test]
    fn error_statuses() {
        let status = |e: Error| ApiError(e).status();
        assert_eq!(status(Error::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(Error::MethodNotAllowed), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(status(Error::config("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(Error::from(ProviderError::RateLimited {
                message: "slow down".into()
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn pipeline_builds_from_default_config() {
        assert!(build_pipeline(Arc::new(AppConfig::default())).is_ok());
    }
}
