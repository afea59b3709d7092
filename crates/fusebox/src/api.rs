use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;
use crate::engine::ToggleOutcome;
use crate::engine::ToggleRequest;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

/// Response for the /v1/power endpoint
#[derive(Serialize)]
struct PowerResponse {
    power: f64,
    has_power: bool,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    version: &'static str,
    engine: Arc<Engine>,
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

/// Handler for GET /v1/power
#[tracing::instrument(skip(state))]
async fn power(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.engine.snapshot();
    (
        StatusCode::OK,
        Json(PowerResponse {
            power: snapshot.power,
            has_power: snapshot.has_power,
        }),
    )
}

/// Handler for GET /v1/lights
#[tracing::instrument(skip(state))]
async fn lights(State(state): State<Arc<AppState>>) -> Json<HashMap<String, bool>> {
    Json(state.engine.all_light_states())
}

/// Handler for POST /v1/toggle
#[tracing::instrument(skip_all)]
async fn toggle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> impl IntoResponse {
    let outcome = state.engine.handle_toggle_request(request);
    let status = match outcome {
        ToggleOutcome::Rejected { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };
    (status, Json(outcome))
}

/// Handler for POST /v1/reset
#[tracing::instrument(skip(state))]
async fn reset(State(state): State<Arc<AppState>>) -> StatusCode {
    state.engine.reset();
    StatusCode::NO_CONTENT
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/power", get(power))
        .route("/v1/lights", get(lights))
        .route("/v1/toggle", post(toggle))
        .route("/v1/reset", post(reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// Binds to `listen:port` and serves the API until `shutdown_rx` fires.
pub async fn serve(
    listen: String,
    port: u16,
    engine: Arc<Engine>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState { version, engine });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::config::PowerConfig;
    use crate::engine::SceneActuator;

    fn router() -> (Router, Arc<Engine>) {
        let scene = SceneActuator::new();
        scene.add_fixture("hallway", &["ceiling".to_string()]);
        let engine = Arc::new(Engine::new(&PowerConfig::default(), Arc::new(scene)));
        let state = Arc::new(AppState {
            version: "test",
            engine: engine.clone(),
        });
        (create_router(state), engine)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let (router, _) = router();
        let request = Request::get("/v1/ping").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_toggle_and_read_back() {
        let (router, engine) = router();

        let (status, body) = send(
            router.clone(),
            post_json("/v1/toggle", json!({"requester": "alice", "light_id": "hallway"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"outcome": "toggled", "light_id": "hallway", "on": true})
        );

        let request = Request::get("/v1/power").body(Body::empty()).unwrap();
        let (_, body) = send(router.clone(), request).await;
        assert_eq!(body, json!({"power": 90.0, "has_power": true}));

        let request = Request::get("/v1/lights").body(Body::empty()).unwrap();
        let (_, body) = send(router, request).await;
        assert_eq!(body, json!({"hallway": true}));

        assert_eq!(engine.power(), 90.0);
    }

    #[tokio::test]
    async fn test_toggle_rejects_non_string_id() {
        let (router, engine) = router();

        let (status, body) = send(
            router,
            post_json("/v1/toggle", json!({"requester": "mallory", "light_id": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["outcome"], "rejected");
        assert_eq!(engine.power(), 100.0);
    }

    #[tokio::test]
    async fn test_toggle_denied_without_power() {
        let (router, engine) = router();
        engine.set_power(0.0);

        let (status, body) = send(
            router,
            post_json("/v1/toggle", json!({"requester": "bob", "light_id": "hallway"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"outcome": "denied", "light_id": "hallway"}));
    }

    #[tokio::test]
    async fn test_reset() {
        let (router, engine) = router();
        engine.handle_toggle_request(ToggleRequest::new("alice", "hallway"));

        let request = Request::post("/v1/reset").body(Body::empty()).unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(engine.power(), 100.0);
        assert!(engine.all_light_states().is_empty());
    }
}
