//! Supplementary read-only views over the input bundle and a finished run:
//! a per-driver recent race breakdown, predicted-vs-actual comparison and a
//! summary of how much data a run looked at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::signals::points_for;
use crate::model::{EventResult, FinishRecord, InputBundle};
use crate::prediction::Prediction;
use crate::weights::FeatureKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSummary {
    pub race_name: String,
    pub round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// 0 when no grid slot was recorded.
    pub grid_position: u32,
    pub finish_position: u32,
    /// grid − finish; 0 without a grid slot.
    pub position_change: i64,
    pub points: u32,
    pub status: String,
    /// 1 = most recent.
    pub recency: usize,
}

/// The driver's last `n` events, most recent first. Events the driver did not
/// take part in are skipped but still count toward the window.
pub fn recent_races(events: &[EventResult], driver_id: &str, n: usize) -> Vec<RaceSummary> {
    let start = events.len().saturating_sub(n);
    events[start..]
        .iter()
        .rev()
        .enumerate()
        .filter_map(|(i, event)| {
            let r = event.result_for(driver_id)?;
            let grid = r.grid_position().unwrap_or(0);
            let position_change = if grid > 0 {
                i64::from(grid) - i64::from(r.position)
            } else {
                0
            };
            Some(RaceSummary {
                race_name: event.name.clone(),
                round: event.round,
                date: event.date.clone(),
                grid_position: grid,
                finish_position: r.position,
                position_change,
                points: points_for(r.position),
                status: r.status.clone().unwrap_or_else(|| "Finished".to_string()),
                recency: i + 1,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictedPlace {
    pub position: usize,
    pub driver: String,
    pub driver_id: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualPlace {
    pub position: usize,
    pub driver_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Accuracy {
    pub winner: bool,
    /// Predicted top-3 drivers that made the actual top 3.
    pub podium: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub predicted: Vec<PredictedPlace>,
    pub actual: Vec<ActualPlace>,
    pub accuracy: Accuracy,
}

/// Compare the top three of a ranking against the actual classification.
/// `actual` may arrive in any order; it is sorted by finishing position.
pub fn compare_with_actual(predictions: &[Prediction], actual: &[FinishRecord]) -> Comparison {
    let predicted: Vec<PredictedPlace> = predictions
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, p)| PredictedPlace {
            position: i + 1,
            driver: p.driver.full_name(),
            driver_id: p.driver.id.clone(),
            probability: p.win_probability,
        })
        .collect();

    let mut classified: Vec<&FinishRecord> = actual.iter().filter(|r| r.position > 0).collect();
    classified.sort_by_key(|r| r.position);
    let actual: Vec<ActualPlace> = classified
        .into_iter()
        .take(3)
        .enumerate()
        .map(|(i, r)| ActualPlace {
            position: i + 1,
            driver_id: r.driver_id.clone(),
        })
        .collect();

    let winner = match (predicted.first(), actual.first()) {
        (Some(p), Some(a)) => p.driver_id == a.driver_id,
        _ => false,
    };
    let podium = predicted
        .iter()
        .filter(|p| actual.iter().any(|a| a.driver_id == p.driver_id))
        .count();

    Comparison {
        predicted,
        actual,
        accuracy: Accuracy { winner, podium },
    }
}

/// How much data a run looked at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataUsage {
    pub total_races_analyzed: usize,
    pub drivers_analyzed: usize,
    pub features_extracted: usize,
    pub venue_events: usize,
    /// Recent events carrying at least one grid slot.
    pub qualifying_sessions_analyzed: usize,
    pub last_updated: DateTime<Utc>,
}

impl DataUsage {
    pub fn from_bundle(bundle: &InputBundle, now: DateTime<Utc>) -> Self {
        Self {
            total_races_analyzed: bundle.recent_events.len(),
            drivers_analyzed: bundle.standings.len(),
            features_extracted: FeatureKey::ALL.len(),
            venue_events: bundle.venue_history.len(),
            qualifying_sessions_analyzed: bundle
                .recent_events
                .iter()
                .filter(|e| e.has_grid_data())
                .count(),
            last_updated: now,
        }
    }
}
