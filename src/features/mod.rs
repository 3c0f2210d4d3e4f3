//! # Feature Extractor
//! Turns the raw input bundle into one fixed-size feature vector plus a
//! per-feature (score, weight) breakdown for a driver.
//!
//! Fails softly: a driver missing from the standings yields `None`; every
//! other gap in the data degrades to the feature's neutral default.

pub mod signals;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::model::InputBundle;
use crate::weights::{FeatureKey, FeatureTable};

/// Exactly seven components, ordered as `FeatureKey::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [f64; 7]);

impl FeatureVector {
    pub fn get(&self, key: FeatureKey) -> f64 {
        self.0[key.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    pub score: f64,
    pub weight: f64,
}

impl FeatureScore {
    pub fn contribution(&self) -> f64 {
        self.score * self.weight
    }
}

/// Feature key → (score, weight), iterated in feature-vector order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(BTreeMap<FeatureKey, FeatureScore>);

impl ScoreBreakdown {
    pub fn insert(&mut self, key: FeatureKey, score: FeatureScore) {
        self.0.insert(key, score);
    }

    pub fn get(&self, key: FeatureKey) -> Option<&FeatureScore> {
        self.0.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureKey, &FeatureScore)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain weighted sum of the scores.
    pub fn weighted_sum(&self) -> f64 {
        self.0.values().map(FeatureScore::contribution).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFeatures {
    pub vector: FeatureVector,
    pub breakdown: ScoreBreakdown,
}

/// Window sizes the signals read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    /// Events considered for form, qualifying, venue and position gain.
    pub form: usize,
    /// Head-to-head opponent pool and event window.
    pub pool: usize,
}

impl Default for Windows {
    fn default() -> Self {
        Self { form: 5, pool: 10 }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor<'a> {
    table: &'a FeatureTable,
    windows: Windows,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(table: &'a FeatureTable, windows: Windows) -> Self {
        Self { table, windows }
    }

    /// Compute the vector and breakdown for `driver_id`, or `None` when the
    /// driver is not in the standings.
    pub fn extract(&self, driver_id: &str, bundle: &InputBundle) -> Option<ExtractedFeatures> {
        let rank = bundle.standings_rank(driver_id)?;
        let team_id = bundle.standing_for(driver_id).and_then(|s| s.team_id());
        let Windows { form, pool } = self.windows;

        let values = [
            signals::championship(rank),
            signals::recent_form(&bundle.recent_events, driver_id, form),
            signals::qualifying(
                &bundle.recent_events,
                driver_id,
                bundle.current_qualifying.as_ref(),
                form,
            ),
            signals::venue_history(&bundle.venue_history, driver_id, form),
            signals::team_strength(&bundle.team_standings, team_id),
            signals::position_gain(&bundle.recent_events, driver_id, form),
            signals::head_to_head(&bundle.recent_events, &bundle.standings, driver_id, pool, pool),
        ];

        let mut breakdown = ScoreBreakdown::default();
        for key in FeatureKey::ALL {
            breakdown.insert(
                key,
                FeatureScore {
                    score: values[key.index()],
                    weight: self.table.weight(key),
                },
            );
        }

        debug!(driver = driver_id, rank, features = ?values, "features extracted");

        Some(ExtractedFeatures {
            vector: FeatureVector(values),
            breakdown,
        })
    }
}
