//! HTTP and websocket surface for the scanner view and filter settings.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use scanner_core::{NoveltyAlert, ScannerError, ScannerRow, SettingsStore, ThresholdConfig};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::state::{AppState, ScannerUpdate};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(e: ScannerError) -> Self {
        tracing::error!("Settings store failure: {}", e);
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/rows", get(get_rows))
        .route("/api/novelty", get(get_novelty))
        .route("/api/settings", get(get_settings).put(save_settings))
        .route("/api/settings/reset", post(reset_settings))
        .route("/ws/scanner", get(ws_scanner_handler))
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

async fn get_rows(State(state): State<AppState>) -> Json<ApiResponse<Vec<ScannerRow>>> {
    Json(ApiResponse::success(state.rows().await))
}

async fn get_novelty(State(state): State<AppState>) -> Json<ApiResponse<Option<NoveltyAlert>>> {
    Json(ApiResponse::success(state.latest_novelty()))
}

async fn get_settings(
    State(state): State<AppState>,
) -> Json<ApiResponse<Option<ThresholdConfig>>> {
    Json(ApiResponse::success(state.current_settings().await))
}

async fn save_settings(
    State(state): State<AppState>,
    Json(config): Json<ThresholdConfig>,
) -> Result<Json<ApiResponse<ThresholdConfig>>, AppError> {
    let config = persist(&state, move |store| store.save(&config).map(|_| config)).await?;
    tracing::info!(?config, "Filter settings updated");
    Ok(Json(ApiResponse::success(config)))
}

async fn reset_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ThresholdConfig>>, AppError> {
    let config = persist(&state, |store| store.reset()).await?;
    tracing::info!("Filter settings reset to defaults");
    Ok(Json(ApiResponse::success(config)))
}

/// Writes the file and swaps the live settings under one lock, so the
/// filter in use always matches what a restart would load.
async fn persist<F>(state: &AppState, write: F) -> Result<ThresholdConfig, AppError>
where
    F: FnOnce(&SettingsStore) -> Result<ThresholdConfig, ScannerError> + Send + 'static,
{
    let mut settings = state.settings.write().await;
    let store = state.store.clone();
    let config = tokio::task::spawn_blocking(move || write(&store))
        .await
        .map_err(|e| AppError::with_status(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    *settings = Some(config.clone());
    Ok(config)
}

async fn ws_scanner_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_scanner_socket(socket, state))
}

async fn handle_scanner_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.updates.subscribe();

    // Current view first, then live updates.
    let snapshot = ScannerUpdate::Rows(state.rows().await);
    if let Ok(json) = serde_json::to_string(&snapshot) {
        if sender.send(Message::Text(json)).await.is_err() {
            return;
        }
    }

    let send_task = tokio::spawn(async move {
        loop {
            let update = match rx.recv().await {
                Ok(update) => update,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Scanner websocket client lagging");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if let Ok(json) = serde_json::to_string(&update) {
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use scanner_core::{MetricThreshold, NewsItem, Scanner, StockEvent};
    use serde_json::Value;
    use tower::ServiceExt;

    fn state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(
            Scanner::new(),
            SettingsStore::new(dir.path().join("settings.json")),
            None,
        )
    }

    async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = api_routes()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(&state(&dir), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "ok");
    }

    #[tokio::test]
    async fn test_rows_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        {
            let mut scanner = state.scanner.lock().await;
            for symbol in ["OLD", "NEW"] {
                let event = StockEvent {
                    symbol: symbol.into(),
                    price: 1.0,
                    price_change_ratio: 0.3,
                    news: vec![NewsItem::default()],
                    volume: 250_000,
                    market_cap: 1,
                    shares_float: 1,
                    alert_count: 2,
                    internal_url: "u".into(),
                };
                scanner.process(event, None, &chrono::Local::now());
            }
        }

        let (status, body) = call(&state, get("/api/rows")).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["event"]["symbol"], "NEW");
        assert_eq!(rows[0]["volume"], "250,000");
        assert_eq!(rows[0]["volume_tier"], "dark");
        assert_eq!(rows[0]["cell_classes"]["volume"], "bg-green-700");
        assert_eq!(rows[0]["change_percentage"], "30.00%");
    }

    #[tokio::test]
    async fn test_novelty_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (_, body) = call(&state(&dir), get("/api/novelty")).await;
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_save_and_reset_settings() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let (_, body) = call(&state, get("/api/settings")).await;
        assert!(body["data"].is_null());

        let request = Request::builder()
            .method("PUT")
            .uri("/api/settings")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"volume": {"direction": "above", "cutoff": 1000000}, "require_news": true}"#,
            ))
            .unwrap();
        let (status, body) = call(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["volume"]["cutoff"], 1_000_000.0);

        let applied = state.current_settings().await.unwrap();
        assert_eq!(applied.volume, MetricThreshold::above(1_000_000.0));
        assert!(applied.require_news);
        assert_eq!(state.store.load().unwrap(), Some(applied));

        let request = Request::builder()
            .method("POST")
            .uri("/api/settings/reset")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.current_settings().await, Some(ThresholdConfig::default()));
        assert_eq!(state.store.load().unwrap(), Some(ThresholdConfig::default()));
    }

    fn put_settings(volume_cutoff: u64) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/api/settings")
            .header("content-type", "application/json")
            .body(Body::from(format!(
                r#"{{"volume": {{"direction": "above", "cutoff": {}}}}}"#,
                volume_cutoff
            )))
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_file_and_memory_in_sync() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let handles: Vec<_> = (1..=16u64)
            .map(|i| {
                let state = state.clone();
                tokio::spawn(async move { call(&state, put_settings(i * 1_000)).await })
            })
            .collect();
        for handle in handles {
            let (status, _) = handle.await.unwrap();
            assert_eq!(status, StatusCode::OK);
        }

        let applied = state.current_settings().await;
        assert!(applied.is_some());
        assert_eq!(state.store.load().unwrap(), applied);
    }

    #[tokio::test]
    async fn test_invalid_direction_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let request = Request::builder()
            .method("PUT")
            .uri("/api/settings")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"price": {"direction": "sideways", "cutoff": 1}}"#))
            .unwrap();
        let response = api_routes()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.current_settings().await.is_none());
    }
}
