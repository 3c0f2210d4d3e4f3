//! # Scoring Engine
//! Pure, testable logic that maps an input bundle → ranked `Prediction`s.
//! No I/O; the feature table is owned by the engine and never mutated.
//!
//! Policy: the score is the plain weighted sum of the breakdown; drivers are
//! stable-sorted by score (ties keep standings order); win probabilities are
//! each score over the sum of the top-`pool` scores, for every driver, so
//! drivers outside the pool get a percentage against a denominator that
//! excludes them. Confidence measures feature consistency, not accuracy.

use std::time::Instant;

use tracing::{info, warn};

use crate::attribution::{self, AttributionRecord};
use crate::config::EngineConfig;
use crate::error::ScoringError;
use crate::features::{ExtractedFeatures, FeatureExtractor, FeatureVector, Windows};
use crate::metrics as engine_metrics;
use crate::model::InputBundle;
use crate::prediction::{Confidence, Prediction};
use crate::weights::FeatureTable;

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    table: FeatureTable,
    windows: Windows,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(FeatureTable::default(), Windows::default())
    }
}

impl ScoringEngine {
    pub fn new(table: FeatureTable, windows: Windows) -> Self {
        Self { table, windows }
    }

    /// Build from config, loading the weight override file if one is set.
    pub fn from_config(cfg: &EngineConfig) -> anyhow::Result<Self> {
        let table = match &cfg.weights_path {
            Some(p) => FeatureTable::load_from_file(p)?,
            None => FeatureTable::default(),
        };
        Ok(Self::new(table, cfg.windows()))
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn windows(&self) -> Windows {
        self.windows
    }

    /// Feature extraction for a single driver; `None` if not in the standings.
    pub fn extract(&self, driver_id: &str, bundle: &InputBundle) -> Option<ExtractedFeatures> {
        FeatureExtractor::new(&self.table, self.windows).extract(driver_id, bundle)
    }

    /// Attribution records for one prediction against this engine's table.
    pub fn attribute(&self, prediction: &Prediction) -> Vec<AttributionRecord> {
        attribution::attribute(prediction, &self.table)
    }

    /// Rank every driver in the standings and normalize win probabilities.
    ///
    /// Errors with `EmptyStandings` when there is nothing to rank and with
    /// `DegenerateNormalization` when the top-pool scores sum to exactly zero.
    pub fn score_all(&self, bundle: &InputBundle) -> Result<Vec<Prediction>, ScoringError> {
        let started = Instant::now();
        let result = self.ranked(bundle).and_then(|mut predictions| {
            self.normalize(&mut predictions)?;
            Ok(predictions)
        });
        self.record_run(&result, started);
        result
    }

    /// Like `score_all`, but a degenerate normalization yields the ranking
    /// with every win probability at 0% instead of an error.
    pub fn score_all_or_zero(&self, bundle: &InputBundle) -> Result<Vec<Prediction>, ScoringError> {
        let started = Instant::now();
        let result = self.ranked(bundle).and_then(|mut predictions| {
            match self.normalize(&mut predictions) {
                Ok(()) => Ok(predictions),
                Err(ScoringError::DegenerateNormalization { pool_size }) => {
                    warn!(pool_size, "degenerate normalization, reporting 0% for all drivers");
                    Ok(predictions)
                }
                Err(e) => Err(e),
            }
        });
        self.record_run(&result, started);
        result
    }

    /// Extract, score and stable-sort; win probabilities are left at 0.
    fn ranked(&self, bundle: &InputBundle) -> Result<Vec<Prediction>, ScoringError> {
        if bundle.standings.is_empty() {
            return Err(ScoringError::EmptyStandings);
        }

        let extractor = FeatureExtractor::new(&self.table, self.windows);
        let mut predictions: Vec<Prediction> = bundle
            .standings
            .iter()
            .filter_map(|standing| {
                let extracted = extractor.extract(&standing.driver.id, bundle)?;
                let confidence_score = consistency(&extracted.vector);
                Some(Prediction {
                    driver: standing.driver.clone(),
                    team: standing.team.clone(),
                    championship_points: standing.points,
                    championship_position: standing.position,
                    score: extracted.breakdown.weighted_sum(),
                    win_probability: 0.0,
                    confidence: Confidence::from_score(confidence_score),
                    confidence_score,
                    breakdown: extracted.breakdown,
                    feature_vector: extracted.vector,
                })
            })
            .collect();

        // `sort_by` is stable: equal scores keep standings order.
        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(predictions)
    }

    fn normalize(&self, predictions: &mut [Prediction]) -> Result<(), ScoringError> {
        let pool_size = self.windows.pool;
        let total: f64 = predictions.iter().take(pool_size).map(|p| p.score).sum();
        if total == 0.0 {
            return Err(ScoringError::DegenerateNormalization { pool_size });
        }
        for p in predictions.iter_mut() {
            p.win_probability = (p.score / total) * 100.0;
        }
        Ok(())
    }

    fn record_run(&self, result: &Result<Vec<Prediction>, ScoringError>, started: Instant) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(predictions) => {
                engine_metrics::record_run(predictions.len(), elapsed_ms);
                if let Some(top) = predictions.first() {
                    info!(
                        drivers = predictions.len(),
                        top = %top.driver.id,
                        top_win_probability = top.win_probability,
                        "scoring run complete"
                    );
                }
            }
            Err(e) => {
                engine_metrics::record_failure();
                warn!(error = %e, "scoring run failed");
            }
        }
    }
}

/// `max(0, 1 - sqrt(population variance))` over the raw feature scores.
pub fn consistency(vector: &FeatureVector) -> f64 {
    let values = vector.as_slice();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt()).max(0.0)
}
