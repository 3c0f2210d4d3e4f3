//! # Feature Table
//!
//! The fixed weight and display-metadata table for the seven ranking
//! features. Built once, owned by the engine, never mutated. Alternate tables
//! can be constructed (tests, calibration) but always pass validation.
//!
//! Override file shape (TOML):
//! ```toml
//! [weights]
//! championship = 0.15
//! recentForm = 0.20
//! ```
//! JSON uses the same keys: `{ "weights": { "championship": 0.15 } }`.
//! Keys that are left out keep their default weight.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::error::ScoringError;

/// Tolerance for "weights sum to 1.0".
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// The seven features, in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKey {
    Championship,
    RecentForm,
    Qualifying,
    VenueHistory,
    TeamStrength,
    PositionGain,
    HeadToHead,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 7] = [
        FeatureKey::Championship,
        FeatureKey::RecentForm,
        FeatureKey::Qualifying,
        FeatureKey::VenueHistory,
        FeatureKey::TeamStrength,
        FeatureKey::PositionGain,
        FeatureKey::HeadToHead,
    ];

    /// Slot in the feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKey::Championship => "championship",
            FeatureKey::RecentForm => "recentForm",
            FeatureKey::Qualifying => "qualifying",
            FeatureKey::VenueHistory => "venueHistory",
            FeatureKey::TeamStrength => "teamStrength",
            FeatureKey::PositionGain => "positionGain",
            FeatureKey::HeadToHead => "headToHead",
        }
    }
}

/// Weight plus display metadata for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub key: FeatureKey,
    pub name: &'static str,
    pub weight: f64,
    pub description: &'static str,
    pub data_source: &'static str,
    pub impact: &'static str,
}

/// Ordered, validated set of seven `FeatureSpec`s.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureTable {
    specs: Vec<FeatureSpec>,
}

impl Default for FeatureTable {
    fn default() -> Self {
        let specs = vec![
            FeatureSpec {
                key: FeatureKey::Championship,
                name: "Championship Position",
                weight: 0.15,
                description: "Current standing in the drivers championship",
                data_source: "Driver Standings",
                impact: "Higher positions indicate consistent performance",
            },
            FeatureSpec {
                key: FeatureKey::RecentForm,
                name: "Recent Race Form",
                weight: 0.20,
                description: "Performance in the last 5 races (positions, points scored)",
                data_source: "Race Results - Last 5 Rounds",
                impact: "Recent momentum is a strong predictor of upcoming performance",
            },
            FeatureSpec {
                key: FeatureKey::Qualifying,
                name: "Qualifying Performance",
                weight: 0.18,
                description: "Grid positions achieved in qualifying sessions",
                data_source: "Qualifying Results",
                impact: "Starting position strongly correlates with race finish",
            },
            FeatureSpec {
                key: FeatureKey::VenueHistory,
                name: "Circuit-Specific History",
                weight: 0.18,
                description: "Historical performance at the upcoming venue",
                data_source: "Circuit Results - Previous Editions",
                impact: "Repeat winners at a venue tend to carry a circuit advantage",
            },
            FeatureSpec {
                key: FeatureKey::TeamStrength,
                name: "Constructor/Team Strength",
                weight: 0.13,
                description: "Team's current season performance and car development",
                data_source: "Constructor Standings",
                impact: "Car performance is crucial in F1",
            },
            FeatureSpec {
                key: FeatureKey::PositionGain,
                name: "Position Gains/Losses",
                weight: 0.08,
                description: "Average positions gained from grid to finish",
                data_source: "Race Results - Grid vs Finish Analysis",
                impact: "Shows overtaking ability and race craft",
            },
            FeatureSpec {
                key: FeatureKey::HeadToHead,
                name: "Head-to-Head Record",
                weight: 0.08,
                description: "Direct comparison with other top drivers",
                data_source: "Race Results - Driver Comparisons",
                impact: "Performance against direct competitors",
            },
        ];
        Self { specs }
    }
}

impl FeatureTable {
    /// Default metadata with substituted weights. Keys absent from
    /// `overrides` keep their default weight.
    pub fn with_weights(overrides: &BTreeMap<FeatureKey, f64>) -> Result<Self, ScoringError> {
        let mut table = Self::default();
        for spec in table.specs.iter_mut() {
            if let Some(&w) = overrides.get(&spec.key) {
                spec.weight = w;
            }
        }
        table.validate()?;
        Ok(table)
    }

    /// Load a weight override from a TOML or JSON file (chosen by extension).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct WeightsFile {
            #[serde(default)]
            weights: BTreeMap<FeatureKey, f64>,
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feature weights from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let parsed: WeightsFile = if ext == "json" {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON weights {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("parsing TOML weights {}", path.display()))?
        };

        Ok(Self::with_weights(&parsed.weights)?)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        for spec in &self.specs {
            if !spec.weight.is_finite() || spec.weight < 0.0 {
                return Err(ScoringError::InvalidWeights(format!(
                    "{} has weight {}",
                    spec.key.as_str(),
                    spec.weight
                )));
            }
        }
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidWeights(format!(
                "weights sum to {sum}, expected 1.0"
            )));
        }
        Ok(())
    }

    pub fn weight_sum(&self) -> f64 {
        self.specs.iter().map(|s| s.weight).sum()
    }

    pub fn weight(&self, key: FeatureKey) -> f64 {
        self.get(key).map(|s| s.weight).unwrap_or(0.0)
    }

    pub fn get(&self, key: FeatureKey) -> Option<&FeatureSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.specs.iter()
    }
}
