use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::analysis::{self, Comparison, DataUsage, RaceSummary};
use crate::attribution::AttributionRecord;
use crate::engine::ScoringEngine;
use crate::error::ScoringError;
use crate::history::{History, RunSnapshot};
use crate::model::{FinishRecord, InputBundle};
use crate::store::{self, RecordStore, RECENT_EVENTS_LIMIT};
use crate::weights::FeatureTable;

const HISTORY_CAPACITY: usize = 50;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    engine: Arc<ScoringEngine>,
    history: Arc<History>,
    default_venue: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        engine: ScoringEngine,
        default_venue: Option<String>,
    ) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
            history: Arc::new(History::with_capacity(HISTORY_CAPACITY)),
            default_venue,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/features", get(features))
        .route("/predictions", get(predict))
        .route("/predictions/latest", get(latest))
        .route(
            "/predictions/latest/{driver_id}/attribution",
            get(latest_attribution),
        )
        .route("/predictions/latest/compare", post(compare_latest))
        .route("/drivers/{driver_id}/recent", get(driver_recent))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Handler errors mapped to status codes with a JSON `{ "error": .. }` body.
pub enum ApiError {
    Scoring(ScoringError),
    Store(anyhow::Error),
    NotFound(&'static str),
    BadRequest(String),
}

impl From<ScoringError> for ApiError {
    fn from(e: ScoringError) -> Self {
        ApiError::Scoring(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Scoring(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Store(e) => {
                error!(error = ?e, "record store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(json!({ "error": msg }))).into_response()
    }
}

async fn features(State(state): State<AppState>) -> Json<FeatureTable> {
    Json(state.engine.table().clone())
}

#[derive(serde::Deserialize)]
struct PredictQuery {
    #[serde(default)]
    venue: Option<String>,
}

async fn predict(
    State(state): State<AppState>,
    Query(q): Query<PredictQuery>,
) -> Result<Json<RunSnapshot>, ApiError> {
    let venue_id = q.venue.or_else(|| state.default_venue.clone());
    if let Some(v) = venue_id.as_deref().filter(|v| !store::is_valid_venue_id(v)) {
        return Err(ApiError::BadRequest(format!("invalid venue id: {v:?}")));
    }
    let bundle =
        InputBundle::from_store(state.store.as_ref(), venue_id.as_deref()).map_err(ApiError::Store)?;

    let predictions = state.engine.score_all(&bundle)?;
    let now = Utc::now();
    let snapshot = RunSnapshot {
        generated_at: now,
        venue_id,
        data_usage: DataUsage::from_bundle(&bundle, now),
        predictions,
    };
    state.history.push(snapshot.clone());
    info!(runs = state.history.len(), "prediction run recorded");
    Ok(Json(snapshot))
}

async fn latest(State(state): State<AppState>) -> Json<Option<RunSnapshot>> {
    Json(state.history.latest())
}

async fn latest_attribution(
    State(state): State<AppState>,
    Path(driver_id): Path<String>,
) -> Json<Vec<AttributionRecord>> {
    let records = state
        .history
        .latest()
        .and_then(|run| {
            run.prediction_for(&driver_id)
                .map(|p| state.engine.attribute(p))
        })
        .unwrap_or_default();
    Json(records)
}

async fn compare_latest(
    State(state): State<AppState>,
    Json(actual): Json<Vec<FinishRecord>>,
) -> Result<Json<Comparison>, ApiError> {
    let run = state
        .history
        .latest()
        .ok_or(ApiError::NotFound("no prediction run yet"))?;
    Ok(Json(analysis::compare_with_actual(&run.predictions, &actual)))
}

async fn driver_recent(
    State(state): State<AppState>,
    Path(driver_id): Path<String>,
) -> Result<Json<Vec<RaceSummary>>, ApiError> {
    let events = state
        .store
        .get_recent_events(RECENT_EVENTS_LIMIT)
        .map_err(ApiError::Store)?;
    let window = state.engine.windows().form;
    Ok(Json(analysis::recent_races(&events, &driver_id, window)))
}
