//! prediction.rs: output records of a scoring run.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, ScoreBreakdown};
use crate::model::{Driver, Team};

/// Coarse consistency bucket derived from the spread of the feature scores.
/// It says nothing about predictive accuracy: a uniformly mediocre driver can
/// be `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Confidence::High
        } else if score > 0.4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// One ranked driver. Created once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub driver: Driver,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    pub championship_points: f64,
    /// Stored standings position, for display only.
    pub championship_position: u32,
    /// Raw weighted-sum score (unnormalized probability mass).
    pub score: f64,
    /// Percentage against the top-pool score sum.
    pub win_probability: f64,
    pub confidence: Confidence,
    /// `max(0, 1 - stddev)` of the seven feature scores.
    pub confidence_score: f64,
    pub breakdown: ScoreBreakdown,
    pub feature_vector: FeatureVector,
}
