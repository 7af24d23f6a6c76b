//! HTTP API поверх сохранённого классификатора

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::models::CampaignClassifier;
use crate::preprocessing::transform;
use crate::types::{CampaignTable, PredictRequest, PredictResponse, Prediction};

#[derive(Clone)]
pub struct AppState {
    classifier: Arc<CampaignClassifier>,
}

impl AppState {
    pub fn new(classifier: CampaignClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Campaign success classifier API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, String)> {
    tracing::info!("Predict request: {} records", request.records.len());

    if request.records.is_empty() {
        return Ok(Json(PredictResponse {
            predictions: Vec::new(),
        }));
    }

    let raw = CampaignTable::from(request.records.as_slice());
    let labels = transform(&raw)
        .map_err(|e| e.to_string())
        .and_then(|table| state.classifier.predict(&table).map_err(|e| e.to_string()))
        .map_err(|message| {
            tracing::warn!("Rejected predict request: {}", message);
            (StatusCode::UNPROCESSABLE_ENTITY, message)
        })?;

    Ok(Json(PredictResponse {
        predictions: labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| Prediction {
                index,
                is_successful: label == 1,
            })
            .collect(),
    }))
}
