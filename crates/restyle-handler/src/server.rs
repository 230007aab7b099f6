//! HTTP surface: the convert route, a health check, CORS headers and tracing.
//!
//! Every convert reply carries the JSON envelope, including bodies axum
//! refuses to buffer (over the default 2 MB limit).

use std::future::Future;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    AUTHORIZATION,
};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::json;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use restyle_core::ConvertError;

use crate::pipeline::{ConvertPipeline, Reply};

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.envelope {
            Some(envelope) => (self.status, Json(envelope)).into_response(),
            None => (self.status, Body::empty()).into_response(),
        }
    }
}

async fn convert(
    State(pipeline): State<Arc<ConvertPipeline>>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Reply {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let body = match &body {
        Ok(bytes) => Ok(bytes.as_ref()),
        Err(rejection) => {
            warn!(status = %rejection.status(), error = %rejection.body_text(), "request body rejected");
            Err(ConvertError::Parse)
        }
    };
    pipeline.handle_body(&method, authorization, body).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the router: `route` accepts every method and hands it to the pipeline.
pub fn router(pipeline: Arc<ConvertPipeline>, route: &str) -> Router {
    Router::new()
        .route(route, any(convert))
        .route("/health", get(health))
        .with_state(pipeline)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    router: Router,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AccountGate;
    use crate::testing::StubGenerator;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use restyle_accounts::MemoryAccounts;
    use restyle_core::config::{Config, ConversionConfig};
    use restyle_core::{Envelope, Identity};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ROUTE: &str = "/api/convert";

    fn app(pipeline: ConvertPipeline) -> Router {
        router(Arc::new(pipeline), ROUTE)
    }

    fn open_app() -> Router {
        app(ConvertPipeline::new(
            StubGenerator::text("T"),
            ConversionConfig::default(),
        ))
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(ROUTE)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(response: Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
    }

    #[tokio::test]
    async fn test_convert_success_envelope() {
        let response = open_app().oneshot(post(r#"{"text":"hello"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let value: serde_json::Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["convertedText"], "T");
        assert_eq!(value["usage"]["inputLength"], 5);
        assert_eq!(value["usage"]["outputLength"], 1);
        assert!(value.get("error").is_none());
        assert!(value.get("remaining").is_none());
    }

    #[tokio::test]
    async fn test_options_preflight_empty_body() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(ROUTE)
            .body(Body::empty())
            .unwrap();
        let response = open_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert!(read_body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed_with_envelope() {
        let request = Request::builder()
            .method("GET")
            .uri(ROUTE)
            .body(Body::empty())
            .unwrap();
        let response = open_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
        let envelope: Envelope = serde_json::from_slice(&read_body(response).await).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.code.as_deref(), Some("METHOD_NOT_ALLOWED"));
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let response = open_app().oneshot(post(r#"{"text":"   "}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["code"], "EMPTY_INPUT");
        assert!(value["error"].is_string());
        assert!(value.get("convertedText").is_none());
    }

    #[tokio::test]
    async fn test_oversized_body_gets_envelope() {
        let generator = StubGenerator::text("T");
        let router = app(ConvertPipeline::new(generator.clone(), ConversionConfig::default()));
        let text = "a".repeat(3 * 1024 * 1024);

        let response = router
            .oneshot(post(&format!(r#"{{"text":"{text}"}}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert_eq!(response.headers()["content-type"], "application/json");
        let envelope: Envelope = serde_json::from_slice(&read_body(response).await).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.code.as_deref(), Some("PARSE_ERROR"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_authorization_header_reaches_gate() {
        let store = Arc::new(
            MemoryAccounts::new()
                .with_user("tok", Identity::new("abcdef0123456789", None))
                .with_profile("abcdef0123456789", 1),
        );
        let router = app(
            ConvertPipeline::new(StubGenerator::text("T"), ConversionConfig::default())
                .with_accounts(AccountGate::from_store(store.clone(), 5)),
        );

        let mut request = post(r#"{"text":"hello world"}"#);
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let envelope: Envelope = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(envelope.remaining, Some(0));
        assert_eq!(envelope.user.unwrap().id, "abcdef01...");

        let response = router.oneshot(post(r#"{"text":"hello world"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = open_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_end_to_end_with_chat_completions_provider() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "家人们谁懂啊 🥹" } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = Config::default();
        config.providers.deepseek.api_key = "sk-test".into();
        config.providers.deepseek.api_base = Some(mock_server.uri());
        let pipeline = ConvertPipeline::from_config(&config).unwrap();

        let response = app(pipeline)
            .oneshot(post(r#"{"text":"今天的咖啡很好喝","style":"cute"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope: Envelope = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(envelope.converted_text.as_deref(), Some("家人们谁懂啊 🥹"));
    }

    #[tokio::test]
    async fn test_end_to_end_provider_rate_limit() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = Config::default();
        config.providers.deepseek.api_key = "sk-test".into();
        config.providers.deepseek.api_base = Some(mock_server.uri());
        let pipeline = ConvertPipeline::from_config(&config).unwrap();

        let response = app(pipeline).oneshot(post(r#"{"text":"hello"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let envelope: Envelope = serde_json::from_slice(&read_body(response).await).unwrap();
        assert_eq!(envelope.code.as_deref(), Some("RATE_LIMITED"));
    }
}
