//! # Feature Attribution
//! Re-expresses a stored score breakdown as a sorted list of per-feature
//! contributions for explainability. Pure and deterministic.

use serde::Serialize;

use crate::features::ScoreBreakdown;
use crate::prediction::Prediction;
use crate::weights::{FeatureKey, FeatureTable};

/// One feature's share of a driver's score, in percentage units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRecord {
    pub key: FeatureKey,
    pub feature: String,
    /// score × 100
    pub score: f64,
    /// weight × 100
    pub weight: f64,
    /// score × weight × 100
    pub weighted_score: f64,
    pub description: String,
    pub data_source: String,
    pub impact: String,
}

/// Attribution for a prediction's stored breakdown.
pub fn attribute(prediction: &Prediction, table: &FeatureTable) -> Vec<AttributionRecord> {
    attribute_breakdown(&prediction.breakdown, table)
}

/// Table order first, then a stable sort descending by weighted score.
/// Features missing from the breakdown are skipped; an empty breakdown
/// gives an empty list.
pub fn attribute_breakdown(breakdown: &ScoreBreakdown, table: &FeatureTable) -> Vec<AttributionRecord> {
    let mut records: Vec<AttributionRecord> = table
        .iter()
        .filter_map(|spec| {
            let entry = breakdown.get(spec.key)?;
            Some(AttributionRecord {
                key: spec.key,
                feature: spec.name.to_string(),
                score: entry.score * 100.0,
                weight: spec.weight * 100.0,
                weighted_score: entry.score * spec.weight * 100.0,
                description: spec.description.to_string(),
                data_source: spec.data_source.to_string(),
                impact: spec.impact.to_string(),
            })
        })
        .collect();

    records.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
    records
}
