// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analysis;
pub mod api;
pub mod attribution;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod history;
pub mod metrics;
pub mod model;
pub mod prediction;
pub mod store;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::attribution::{attribute, AttributionRecord};
pub use crate::config::EngineConfig;
pub use crate::engine::ScoringEngine;
pub use crate::error::ScoringError;
pub use crate::features::{FeatureScore, FeatureVector, ScoreBreakdown, Windows};
pub use crate::model::InputBundle;
pub use crate::prediction::{Confidence, Prediction};
pub use crate::weights::{FeatureKey, FeatureSpec, FeatureTable};

use std::sync::Arc;

use crate::api::AppState;
use crate::store::JsonRecordStore;

/// Build the full HTTP app from an engine config: JSON store over
/// `cfg.data_dir`, engine with the configured weights. The `/metrics` route
/// is added by the binary, which owns the global recorder.
pub fn app(cfg: &EngineConfig) -> anyhow::Result<axum::Router> {
    let engine = ScoringEngine::from_config(cfg)?;
    let store = Arc::new(JsonRecordStore::new(cfg.data_dir.clone()));
    let state = AppState::new(store, engine, cfg.venue_id.clone());
    Ok(create_router(state))
}
